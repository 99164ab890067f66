//! Source files loaded and parsed for one analysis run

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, Result};
use crate::syntax::{CSharpParser, SyntaxTree};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// A parsed C# file belonging to one project.
///
/// The tree is built once and shared read-only by every analysis pass.
#[derive(Debug)]
pub struct SourceFile {
    /// Display name of the owning project
    pub project: String,
    pub path: PathBuf,
    pub text: String,
    pub tree: SyntaxTree,
}

impl SourceFile {
    /// Read and parse a file from disk.
    ///
    /// Content that is not UTF-8 is reported as a parse failure, so it falls
    /// under the same skip/abort policy as a syntax error.
    pub fn load(parser: &mut CSharpParser, project: &str, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalyzerError::not_found(path));
        }
        let text = String::from_utf8(fs::read(path)?).map_err(|_| AnalyzerError::Parse {
            path: path.display().to_string(),
            message: "invalid UTF-8".to_string(),
        })?;
        Self::from_text(parser, project, path, text)
    }

    /// Parse text that is already in memory. A leading byte-order mark is
    /// dropped.
    pub fn from_text(
        parser: &mut CSharpParser,
        project: &str,
        path: &Path,
        mut text: String,
    ) -> Result<Self> {
        if text.starts_with(BYTE_ORDER_MARK) {
            text.replace_range(..BYTE_ORDER_MARK.len_utf8(), "");
        }
        let tree = parser.parse(path, &text)?;
        Ok(Self {
            project: project.to_string(),
            path: path.to_path_buf(),
            text,
            tree,
        })
    }

    /// Path as used in every output record
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
