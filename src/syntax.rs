//! C# grammar loading and the parser capability used by every analysis
//!
//! All analyses consume a [`SyntaxTree`] produced here. The tree is a thin
//! wrapper around a tree-sitter tree: callers query node kinds and iterate
//! children through the tree-sitter [`Node`] API.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{AnalyzerError, Result};

/// File extension of C# source files
pub const SOURCE_EXTENSION: &str = "cs";

/// Get the tree-sitter Language for C#
pub fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// A parsed C# file
pub struct SyntaxTree {
    tree: Tree,
}

impl SyntaxTree {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.root().kind())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

/// Reusable C# parser
///
/// A tree-sitter parser is not shared between threads; each worker creates
/// its own.
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language())
            .map_err(|e| AnalyzerError::Language {
                message: format!("{:?}", e),
            })?;
        Ok(Self { parser })
    }

    /// Parse a whole source file.
    ///
    /// Fails when tree-sitter gives up or when the tree contains error or
    /// missing nodes. `path` is only used for the error message.
    pub fn parse(&mut self, path: &Path, source: &str) -> Result<SyntaxTree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AnalyzerError::Parse {
                path: path.display().to_string(),
                message: "parser produced no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(&root).unwrap_or(1);
            return Err(AnalyzerError::Parse {
                path: path.display().to_string(),
                message: format!("syntax error near line {}", line),
            });
        }

        Ok(SyntaxTree { tree })
    }

    /// Parse a snippet without rejecting syntax errors.
    ///
    /// Used for single-line classification, where a line taken out of its
    /// file is rarely valid C# on its own.
    pub fn parse_fragment(&mut self, text: &str) -> Option<Tree> {
        self.parser.parse(text, None)
    }
}

/// Parse a complete source file with a fresh parser
pub fn parse(path: &Path, source: &str) -> Result<SyntaxTree> {
    CSharpParser::new()?.parse(path, source)
}

/// Get the source text covered by a node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-based line on which a node starts
pub fn start_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Number of lines a node spans
pub fn line_span(node: &Node) -> usize {
    node.end_position().row - node.start_position().row + 1
}

/// Visit a node and all of its descendants in document order
pub fn visit_all<F>(node: &Node, mut callback: F)
where
    F: FnMut(&Node),
{
    visit_all_recursive(node, &mut callback);
}

fn visit_all_recursive<F>(node: &Node, callback: &mut F)
where
    F: FnMut(&Node),
{
    callback(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_all_recursive(&child, callback);
    }
}

/// Visit descendants in document order, skipping the subtree of any node for
/// which `descend` returns false (the node itself is still visited).
pub fn visit_pruned<F, D>(node: &Node, callback: &mut F, descend: &D)
where
    F: FnMut(&Node),
    D: Fn(&Node) -> bool,
{
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        callback(&child);
        if descend(&child) {
            visit_pruned(&child, callback, descend);
        }
    }
}

fn first_error_line(node: &Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(start_line(node));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(&child) {
                return Some(line);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        let source = "namespace A { class Foo { void M() { } } }";
        let tree = parse(Path::new("Foo.cs"), source).unwrap();
        assert_eq!(tree.root().kind(), "compilation_unit");
        assert!(!tree.has_errors());
    }

    #[test]
    fn test_parse_rejects_malformed_source() {
        let source = "namespace A {\n class Foo { void M( { } \n";
        let err = parse(Path::new("Broken.cs"), source).unwrap_err();
        match err {
            AnalyzerError::Parse { path, .. } => assert_eq!(path, "Broken.cs"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fragment_parse_tolerates_errors() {
        let mut parser = CSharpParser::new().unwrap();
        let tree = parser.parse_fragment("} else {").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_node_positions() {
        let source = "class Foo\n{\n    void M()\n    {\n    }\n}\n";
        let tree = parse(Path::new("Foo.cs"), source).unwrap();
        let mut found = None;
        visit_all(&tree.root(), |node| {
            if node.kind() == "method_declaration" {
                found = Some((start_line(node), line_span(node)));
            }
        });
        assert_eq!(found, Some((3, 3)));
    }
}
