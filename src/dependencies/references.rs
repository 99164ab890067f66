//! Per-class extraction of referenced type names
//!
//! Extraction runs once per file and produces owned [`ClassReferences`], so
//! resolution can fan out per class without touching the syntax tree again.

use std::collections::{BTreeSet, HashMap};

use tree_sitter::Node;

use super::catalog::{declaration_of, is_type_declaration, TypeDeclaration};
use crate::source::SourceFile;
use crate::syntax::{node_text, visit_all, visit_pruned};

/// `using` directives visible from a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScope {
    /// Imported namespaces in source order, outermost scope first
    pub namespaces: Vec<String>,
    /// `using Alias = Target;`
    pub aliases: HashMap<String, String>,
}

/// Parsed form of a single `using` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsingDirective {
    Namespace(String),
    Alias { alias: String, target: String },
    /// `using static`; members are imported, not types
    Static,
}

impl UsingDirective {
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.trim().trim_end_matches(';').trim();
        let body = body.strip_prefix("global").map(str::trim_start).unwrap_or(body);
        let body = body.strip_prefix("using")?.trim();

        if body.starts_with("static ") {
            return Some(Self::Static);
        }
        if let Some((alias, target)) = body.split_once('=') {
            let alias = alias.trim();
            let target = compact(target);
            if alias.is_empty() || target.is_empty() {
                return None;
            }
            return Some(Self::Alias {
                alias: alias.to_string(),
                target: target.trim_start_matches("global::").to_string(),
            });
        }

        let name = compact(body);
        (!name.is_empty()).then(|| Self::Namespace(name.trim_start_matches("global::").to_string()))
    }
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

impl ImportScope {
    fn add(&mut self, directive: UsingDirective) {
        match directive {
            UsingDirective::Namespace(name) => {
                if !self.namespaces.contains(&name) {
                    self.namespaces.push(name);
                }
            }
            UsingDirective::Alias { alias, target } => {
                self.aliases.insert(alias, target);
            }
            UsingDirective::Static => {}
        }
    }

    /// Collect the directives of every scope enclosing `node`
    pub fn visible_from(node: &Node, source: &str) -> Self {
        let mut ancestors = Vec::new();
        let mut current = node.parent();
        while let Some(parent) = current {
            ancestors.push(parent);
            current = parent.parent();
        }

        let mut scope = Self::default();
        for ancestor in ancestors.iter().rev() {
            let mut cursor = ancestor.walk();
            for child in ancestor.children(&mut cursor) {
                if child.kind() == "using_directive" {
                    if let Some(directive) = UsingDirective::parse(node_text(&child, source)) {
                        scope.add(directive);
                    }
                }
            }
        }
        scope
    }
}

/// Everything needed to resolve one class's outgoing edges
#[derive(Debug, Clone)]
pub struct ClassReferences {
    pub declaration: TypeDeclaration,
    pub imports: ImportScope,
    /// Raw type expressions, deduplicated
    pub candidates: BTreeSet<String>,
}

/// Extract references for every type declaration in a file
pub fn extract(file: &SourceFile) -> Vec<ClassReferences> {
    let mut classes = Vec::new();
    visit_all(&file.tree.root(), |node| {
        if !is_type_declaration(node) {
            return;
        }
        if let Some(declaration) = declaration_of(node, file) {
            classes.push(ClassReferences {
                declaration,
                imports: ImportScope::visible_from(node, &file.text),
                candidates: candidates_of(node, &file.text),
            });
        }
    });
    classes
}

/// Type names mentioned by a declaration, stopping at nested declarations
fn candidates_of(declaration: &Node, source: &str) -> BTreeSet<String> {
    let name_id = declaration.child_by_field_name("name").map(|n| n.id());
    let mut candidates = BTreeSet::new();
    let mut push = |text: &str| {
        let text = text.trim();
        if !text.is_empty() {
            candidates.insert(text.to_string());
        }
    };

    visit_pruned(
        declaration,
        &mut |node: &Node| match node.kind() {
            "identifier" if Some(node.id()) != name_id => push(node_text(node, source)),
            "base_list" | "type_argument_list" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    push(node_text(&child, source));
                }
            }
            "variable_declaration" | "property_declaration" | "parameter"
            | "object_creation_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    push(node_text(&ty, source));
                }
            }
            "invocation_expression" => {
                let receiver = node
                    .child_by_field_name("function")
                    .filter(|f| f.kind() == "member_access_expression")
                    .and_then(|f| f.child_by_field_name("expression"));
                if let Some(receiver) = receiver {
                    push(node_text(&receiver, source));
                }
            }
            _ => {}
        },
        &|node: &Node| !is_type_declaration(node),
    );
    candidates
}
