//! Solution-wide catalog of declared type names
//!
//! Collection is concurrent. [`CatalogBuilder::finish`] consumes the builder,
//! so the read-only [`ClassCatalog`] only exists once collection is over.

use std::collections::HashSet;

use dashmap::DashSet;
use serde::Serialize;
use tree_sitter::Node;

use crate::source::SourceFile;
use crate::syntax::{node_text, start_line, visit_all};

/// Declarations that take part in the dependency graph
pub(crate) const TYPE_DECLARATION_NODES: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "record_struct_declaration",
];

/// A type declaration found in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDeclaration {
    pub identifier: String,
    pub namespace: Option<String>,
    /// `{namespace}.{identifier}`, or the bare identifier outside any namespace
    pub qualified_name: String,
    pub file_path: String,
    pub line: usize,
}

pub(crate) fn is_type_declaration(node: &Node) -> bool {
    TYPE_DECLARATION_NODES.contains(&node.kind())
}

/// Namespace a declaration belongs to.
///
/// A file-scoped namespace wins; otherwise the nearest enclosing block
/// namespace is used.
pub(crate) fn enclosing_namespace(node: &Node, source: &str) -> Option<String> {
    let root = root_of(node);
    let mut cursor = root.walk();
    let file_scoped = root
        .children(&mut cursor)
        .find(|c| c.kind() == "file_scoped_namespace_declaration");
    if let Some(declaration) = file_scoped {
        return namespace_name(&declaration, source);
    }

    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "namespace_declaration" {
            return namespace_name(&parent, source);
        }
        current = parent.parent();
    }
    None
}

fn namespace_name(declaration: &Node, source: &str) -> Option<String> {
    declaration
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).split_whitespace().collect::<String>())
        .filter(|name| !name.is_empty())
}

fn root_of<'tree>(node: &Node<'tree>) -> Node<'tree> {
    let mut root = *node;
    while let Some(parent) = root.parent() {
        root = parent;
    }
    root
}

pub(crate) fn qualify(namespace: Option<&str>, identifier: &str) -> String {
    match namespace {
        Some(ns) => format!("{}.{}", ns, identifier),
        None => identifier.to_string(),
    }
}

/// Build a declaration record for a type declaration node
pub(crate) fn declaration_of(node: &Node, file: &SourceFile) -> Option<TypeDeclaration> {
    let identifier = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, &file.text).to_string())
        .filter(|name| !name.is_empty())?;
    let namespace = enclosing_namespace(node, &file.text);

    Some(TypeDeclaration {
        qualified_name: qualify(namespace.as_deref(), &identifier),
        identifier,
        namespace,
        file_path: file.display_path(),
        line: start_line(node),
    })
}

/// Every type declaration in a file, nested ones included, in document order
pub fn declarations_in(file: &SourceFile) -> Vec<TypeDeclaration> {
    let mut declarations = Vec::new();
    visit_all(&file.tree.root(), |node| {
        if is_type_declaration(node) {
            if let Some(declaration) = declaration_of(node, file) {
                declarations.push(declaration);
            }
        }
    });
    declarations
}

/// Concurrent collector for the first phase
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    names: DashSet<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every declaration of a file; returns how many were found
    pub fn add_file(&self, file: &SourceFile) -> usize {
        let declarations = declarations_in(file);
        let count = declarations.len();
        for declaration in declarations {
            self.names.insert(declaration.qualified_name);
        }
        count
    }

    #[cfg(test)]
    pub(crate) fn add(&self, qualified_name: impl Into<String>) {
        self.names.insert(qualified_name.into());
    }

    /// End collection and freeze the catalog
    pub fn finish(self) -> ClassCatalog {
        ClassCatalog {
            names: self.names.into_iter().collect(),
        }
    }
}

/// Read-only set of fully-qualified type names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCatalog {
    names: HashSet<String>,
}

impl ClassCatalog {
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.names.contains(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order
    #[cfg(test)]
    pub(crate) fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<String> for ClassCatalog {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::CSharpParser;
    use std::path::Path;

    fn source_file(text: &str) -> SourceFile {
        let mut parser = CSharpParser::new().unwrap();
        SourceFile::from_text(&mut parser, "App", Path::new("/app/File.cs"), text.to_string())
            .unwrap()
    }

    fn names(text: &str) -> Vec<String> {
        declarations_in(&source_file(text))
            .into_iter()
            .map(|d| d.qualified_name)
            .collect()
    }

    #[test]
    fn test_block_namespace() {
        assert_eq!(names("namespace A.B { class Foo { } }"), vec!["A.B.Foo"]);
    }

    #[test]
    fn test_file_scoped_namespace() {
        assert_eq!(
            names("namespace A.B;\n\nclass Foo { }\ninterface IBar { }\n"),
            vec!["A.B.Foo", "A.B.IBar"]
        );
    }

    #[test]
    fn test_no_namespace_is_bare_identifier() {
        assert_eq!(names("class Foo { }"), vec!["Foo"]);
    }

    #[test]
    fn test_nearest_block_namespace_wins() {
        let text = "namespace Outer { namespace Inner { class Foo { } } class Bar { } }";
        assert_eq!(names(text), vec!["Inner.Foo", "Outer.Bar"]);
    }

    #[test]
    fn test_nested_types_use_namespace_not_outer_class() {
        let text = "namespace A { class Outer { class Inner { } struct Point { } } }";
        assert_eq!(names(text), vec!["A.Outer", "A.Inner", "A.Point"]);
    }

    #[test]
    fn test_enums_are_not_cataloged() {
        assert_eq!(names("namespace A { enum Color { Red } class Foo { } }"), vec!["A.Foo"]);
    }

    #[test]
    fn test_declaration_line() {
        let declarations = declarations_in(&source_file("namespace A\n{\n    class Foo\n    {\n    }\n}\n"));
        assert_eq!(declarations[0].line, 3);
        assert_eq!(declarations[0].file_path, "/app/File.cs");
    }

    #[test]
    fn test_builder_finish_freezes_catalog() {
        let builder = CatalogBuilder::new();
        assert_eq!(builder.add_file(&source_file("namespace A { class Foo { } class Bar { } }")), 2);
        builder.add("C.Baz");

        let catalog = builder.finish();

        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("A.Foo"));
        assert!(catalog.contains("C.Baz"));
        assert!(!catalog.contains("Foo"));
        assert_eq!(catalog.sorted_names(), vec!["A.Bar", "A.Foo", "C.Baz"]);
    }
}
