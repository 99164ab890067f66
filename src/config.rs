//! Analysis configuration

use serde::Serialize;

use crate::syntax::SOURCE_EXTENSION;

/// Directories that never contain project sources
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["bin", "obj"];

/// What to do with a file that does not parse cleanly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// Drop the file from every pass and log a warning
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    /// Directory names skipped while enumerating project files.
    /// Hidden directories are always skipped.
    pub excluded_dirs: Vec<String>,
    /// Source file extension, without the dot
    pub extension: String,
    pub parse_failures: ParseFailurePolicy,
    pub detect_duplicates: bool,
    pub resolve_dependencies: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            extension: SOURCE_EXTENSION.to_string(),
            parse_failures: ParseFailurePolicy::default(),
            detect_duplicates: true,
            resolve_dependencies: true,
        }
    }
}

impl AnalysisConfig {
    pub fn with_parse_failures(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_failures = policy;
        self
    }

    /// Add directory names to skip on top of the defaults
    pub fn exclude<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dir in dirs {
            let dir = dir.into();
            if !self.excluded_dirs.contains(&dir) {
                self.excluded_dirs.push(dir);
            }
        }
        self
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded_dirs.iter().any(|d| d == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.extension, "cs");
        assert_eq!(config.parse_failures, ParseFailurePolicy::Skip);
        assert!(config.detect_duplicates);
        assert!(config.resolve_dependencies);
    }

    #[test]
    fn test_excluded_dirs() {
        let config = AnalysisConfig::default().exclude(["packages", "bin"]);
        assert!(config.is_excluded_dir("bin"));
        assert!(config.is_excluded_dir("obj"));
        assert!(config.is_excluded_dir("packages"));
        assert!(config.is_excluded_dir(".vs"));
        assert!(!config.is_excluded_dir("Models"));
        assert_eq!(config.excluded_dirs.len(), 3);
    }
}
