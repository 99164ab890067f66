//! Solutions and the projects they contain

mod files;
mod manifest;

pub use files::collect_sources;
pub use manifest::{parse_manifest, ProjectEntry};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AnalyzerError, Result};

/// A project to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Display name from the manifest, or the project file stem
    pub name: String,
    /// The `.csproj` file
    pub file: PathBuf,
    /// Directory holding the project's sources
    pub dir: PathBuf,
}

impl Project {
    fn from_file(name: String, file: PathBuf) -> Result<Self> {
        if !file.is_file() {
            return Err(AnalyzerError::not_found(&file));
        }
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self { name, file, dir })
    }

    /// Project directory as shown on metrics rows
    pub fn dir_display(&self) -> String {
        self.dir.display().to_string()
    }
}

/// A solution and its resolved projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub name: String,
    pub manifest: PathBuf,
    pub projects: Vec<Project>,
}

impl Solution {
    /// Read a `.sln` manifest and resolve every C# project it lists
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AnalyzerError::not_found(path));
        }
        let text = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let projects = parse_manifest(&text, base_dir)
            .into_iter()
            .map(|entry| Project::from_file(entry.name, entry.path))
            .collect::<Result<Vec<_>>>()?;

        info!(manifest = %path.display(), projects = projects.len(), "loaded solution");
        Ok(Self {
            name: file_stem(path),
            manifest: path.to_path_buf(),
            projects,
        })
    }

    /// Treat a single `.csproj` as a one-project solution
    pub fn from_project(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = file_stem(path);
        let project = Project::from_file(name.clone(), path.to_path_buf())?;
        Ok(Self {
            name,
            manifest: path.to_path_buf(),
            projects: vec![project],
        })
    }

    /// Pick the loader from the file extension
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("csproj") => Self::from_project(path),
            _ => Self::from_manifest(path),
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
