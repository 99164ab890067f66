//! Error types for the analysis pipeline

use std::process::ExitCode;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Errors produced while analyzing a solution
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A manifest, project or source file does not exist
    #[error("not found: {path}")]
    NotFound { path: String },

    /// A source file could not be turned into a syntax tree
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The C# grammar could not be loaded into the parser
    #[error("failed to load C# grammar: {message}")]
    Language { message: String },

    /// Several workers failed during a parallel pass
    #[error("{} analysis failures: {}", .0.len(), summarize(.0))]
    Aggregate(Vec<AnalyzerError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::NotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Collapse the failures of a parallel pass into one error.
    ///
    /// Returns `None` when nothing failed. A single failure is returned as is.
    pub fn aggregate(mut errors: Vec<AnalyzerError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(errors)),
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound { .. } => ExitCode::from(2),
            Self::Parse { .. } => ExitCode::from(3),
            Self::Language { .. } => ExitCode::from(4),
            Self::Aggregate(_) => ExitCode::from(5),
            Self::Io(_) | Self::Json(_) => ExitCode::from(1),
        }
    }
}

fn summarize(errors: &[AnalyzerError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
