//! Cyclomatic complexity over C# syntax trees
//!
//! Every analyzed unit (method, constructor, accessor, local function, or an
//! expression-bodied property) starts at 1 and gains 1 for each branch point
//! in its own body. Units nested inside another unit are scored on their own
//! and never add to the outer score.

use serde::Serialize;
use tree_sitter::Node;

use crate::syntax::{node_text, start_line, visit_pruned, SyntaxTree};

/// Node kinds that are scored as independent units
const UNIT_NODES: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "accessor_declaration",
    "local_function_statement",
];

/// Branch points, one increment each
const BRANCH_NODES: &[&str] = &[
    "if_statement",
    "for_statement",
    "foreach_statement",
    "for_each_statement",
    "while_statement",
    "do_statement",
    "catch_clause",
    // Older grammars wrap case labels in their own node
    "case_switch_label",
    "case_pattern_switch_label",
];

/// Kind of a scored unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Method,
    Constructor,
    Accessor,
    LocalFunction,
    Operator,
    TopLevel,
}

/// Complexity of a single unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitComplexity {
    pub name: String,
    pub kind: UnitKind,
    /// 1-based start line
    pub line: usize,
    pub score: usize,
}

/// Cyclomatic complexity of a whole file.
///
/// The sum of all unit scores. A file without any unit counts as a single
/// straight-line unit and scores 1.
pub fn calculate(tree: &SyntaxTree, source: &str) -> usize {
    let total: usize = calculate_units(tree, source).iter().map(|u| u.score).sum();
    total.max(1)
}

/// Score every unit in the file, in document order
pub fn calculate_units(tree: &SyntaxTree, source: &str) -> Vec<UnitComplexity> {
    let root = tree.root();
    let mut units = Vec::new();

    if let Some(top_level) = score_top_level(&root) {
        units.push(top_level);
    }
    collect_units(&root, source, &mut units);

    units.sort_by_key(|u| u.line);
    units
}

fn collect_units(node: &Node, source: &str, units: &mut Vec<UnitComplexity>) {
    if let Some(kind) = unit_kind(node) {
        units.push(UnitComplexity {
            name: unit_name(node, kind, source),
            kind,
            line: start_line(node),
            score: 1 + count_branches(node),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_units(&child, source, units);
    }
}

/// Top-level statements form one implicit unit
fn score_top_level(root: &Node) -> Option<UnitComplexity> {
    let mut cursor = root.walk();
    let statements: Vec<Node> = root
        .children(&mut cursor)
        .filter(|c| c.kind() == "global_statement")
        .collect();

    let first = statements.first()?;
    let branches: usize = statements
        .iter()
        .map(count_branches)
        .sum();

    Some(UnitComplexity {
        name: "<top-level>".to_string(),
        kind: UnitKind::TopLevel,
        line: start_line(first),
        score: 1 + branches,
    })
}

/// Count branch points below `node`, stopping at nested units
fn count_branches(node: &Node) -> usize {
    let mut count = 0;
    visit_pruned(
        node,
        &mut |n: &Node| {
            if is_branch(n) {
                count += 1;
            }
        },
        &|n: &Node| unit_kind(n).is_none(),
    );
    count
}

fn is_branch(node: &Node) -> bool {
    let kind = node.kind();
    if BRANCH_NODES.contains(&kind) {
        return true;
    }
    // Newer grammars inline `case` labels into the switch section, so the
    // keyword token marks the label. `goto case` is a jump, not a label.
    kind == "case"
        && !node.is_named()
        && node
            .parent()
            .map(|p| p.kind() != "goto_statement" && !BRANCH_NODES.contains(&p.kind()))
            .unwrap_or(false)
}

fn unit_kind(node: &Node) -> Option<UnitKind> {
    let kind = node.kind();
    // Auto-implemented accessors (`get;`) have no body to score
    if kind == "accessor_declaration" && !has_body(node) {
        return None;
    }
    if UNIT_NODES.contains(&kind) {
        return Some(match kind {
            "method_declaration" => UnitKind::Method,
            "constructor_declaration" | "destructor_declaration" => UnitKind::Constructor,
            "accessor_declaration" => UnitKind::Accessor,
            "local_function_statement" => UnitKind::LocalFunction,
            _ => UnitKind::Operator,
        });
    }

    // Expression-bodied properties and indexers have no accessor list
    if matches!(kind, "property_declaration" | "indexer_declaration") && has_arrow_body(node) {
        return Some(UnitKind::Accessor);
    }

    None
}

fn has_body(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| matches!(c.kind(), "block" | "arrow_expression_clause"));
    found
}

fn has_arrow_body(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == "arrow_expression_clause");
    found
}

fn unit_name(node: &Node, kind: UnitKind, source: &str) -> String {
    match kind {
        UnitKind::Accessor if node.kind() == "accessor_declaration" => {
            let accessor = accessor_keyword(node, source);
            match owning_member_name(node, source) {
                Some(owner) => format!("{}.{}", owner, accessor),
                None => accessor,
            }
        }
        _ => member_name(node, source).unwrap_or_else(|| node.kind().to_string()),
    }
}

fn member_name(node: &Node, source: &str) -> Option<String> {
    if node.kind() == "indexer_declaration" {
        return Some("this[]".to_string());
    }
    node.child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
        .filter(|name| !name.is_empty())
}

fn accessor_keyword(node: &Node, source: &str) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        return node_text(&name, source).to_string();
    }
    let mut cursor = node.walk();
    let keyword = node
        .children(&mut cursor)
        .map(|c| c.kind())
        .find(|k| matches!(*k, "get" | "set" | "init" | "add" | "remove"))
        .unwrap_or("accessor");
    keyword.to_string()
}

fn owning_member_name(node: &Node, source: &str) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if matches!(
            parent.kind(),
            "property_declaration" | "indexer_declaration" | "event_declaration"
        ) {
            return member_name(&parent, source);
        }
        current = parent.parent();
    }
    None
}
