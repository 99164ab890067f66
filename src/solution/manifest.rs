//! `.sln` manifest parsing

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `Project("{type-guid}") = "Name", "relative\path.csproj", "{project-guid}"`
static PROJECT_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*Project\("\{[^}]*\}"\)\s*=\s*"([^"]+)"\s*,\s*"([^"]+)"\s*,\s*"\{[^}]*\}""#)
        .expect("project row pattern is valid")
});

const PROJECT_EXTENSION: &str = "csproj";

/// A project row from a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    /// Project file, resolved against the manifest directory
    pub path: PathBuf,
}

/// Extract every C# project row from manifest text.
///
/// Rows for solution folders and non-C# projects are skipped, as is every
/// other line.
pub fn parse_manifest(text: &str, base_dir: &Path) -> Vec<ProjectEntry> {
    text.lines()
        .filter_map(|line| {
            let captures = PROJECT_ROW.captures(line)?;
            let name = captures[1].to_string();
            let relative = captures[2].replace('\\', "/");
            if !relative.ends_with(&format!(".{}", PROJECT_EXTENSION)) {
                debug!(project = %name, path = %relative, "skipping non C# project row");
                return None;
            }
            Some(ProjectEntry {
                name,
                path: base_dir.join(relative),
            })
        })
        .collect()
}
