//! Source file enumeration for a project directory

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::AnalysisConfig;

/// Collect every source file under `dir`, sorted by path.
///
/// Excluded and hidden directories are not entered. Unreadable directories
/// are logged and skipped.
pub fn collect_sources(dir: &Path, config: &AnalysisConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_recursive(dir, config, &mut files);
    files.sort();
    files
}

fn collect_recursive(dir: &Path, config: &AnalysisConfig, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "cannot read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if !should_skip_dir(&path, config) {
                collect_recursive(&path, config, files);
            }
        } else if has_extension(&path, &config.extension) {
            files.push(path);
        }
    }
}

fn should_skip_dir(path: &Path, config: &AnalysisConfig) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |name| config.is_excluded_dir(name))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(extension))
}
