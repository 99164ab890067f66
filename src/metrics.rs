//! Line and complexity metrics per file, rolled up per namespace and project
//!
//! Line classification is line-local: each line is parsed on its
//! own and counts as code when it is not blank and carries no comment. Lines
//! in the middle of a block comment that hold no comment marker of their own
//! therefore count as code.

use std::collections::BTreeMap;

use tracing::debug;
use tree_sitter::Node;

use crate::complexity;
use crate::error::Result;
use crate::report::{MetricScope, NamespaceMetric, NO_NAMESPACE, TOTAL_ROW};
use crate::source::SourceFile;
use crate::syntax::CSharpParser;

const NAMESPACE_KEYWORD: &str = "namespace";

/// Metrics for a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetrics {
    /// First namespace declared in the file
    pub namespace: Option<String>,
    /// Number of code lines
    pub line_count: usize,
    /// Cyclomatic complexity of the whole file
    pub complexity: usize,
}

/// Decides whether a single line is code
pub struct LineClassifier {
    parser: CSharpParser,
}

impl LineClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: CSharpParser::new()?,
        })
    }

    /// A line is code when it is not blank and, parsed on its own, contains
    /// no single-line, block or documentation comment.
    pub fn is_code(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        !self.has_comment(line)
    }

    fn has_comment(&mut self, line: &str) -> bool {
        if self.contains_comment_node(line) {
            return true;
        }
        // An unterminated `/*` is still comment trivia. Closing it and parsing
        // again tells a real comment opener apart from `/*` inside a string.
        line.contains("/*") && self.contains_comment_node(&format!("{}*/", line))
    }

    fn contains_comment_node(&mut self, text: &str) -> bool {
        match self.parser.parse_fragment(text) {
            Some(tree) => contains_comment(&tree.root_node()),
            None => false,
        }
    }
}

fn contains_comment(node: &Node) -> bool {
    if node.kind() == "comment" {
        return true;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| contains_comment(&c));
    found
}

/// Namespace declared on a line, if the line is a namespace declaration.
///
/// Returns `Some(None)` for a bare `namespace` keyword with the name on a
/// later line.
pub fn namespace_declared_on(line: &str) -> Option<Option<String>> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != NAMESPACE_KEYWORD {
        return None;
    }
    let name = tokens
        .next()
        .map(|t| t.trim_end_matches(|c| c == ';' || c == '{'))
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    Some(name)
}

/// Compute metrics for one file.
///
/// Every code line overwrites the count stored for the current namespace in
/// `namespace_lines` with the file's running code-line count.
pub fn analyze_file(
    file: &SourceFile,
    classifier: &mut LineClassifier,
    namespace_lines: &mut BTreeMap<String, usize>,
) -> FileMetrics {
    let mut namespace: Option<String> = None;
    let mut namespace_seen = false;
    let mut line_count = 0;

    for line in file.text.lines() {
        if !namespace_seen {
            if let Some(declared) = namespace_declared_on(line) {
                namespace = declared;
                namespace_seen = true;
            }
        }

        if classifier.is_code(line) {
            line_count += 1;
            let key = namespace.as_deref().unwrap_or(NO_NAMESPACE);
            namespace_lines.insert(key.to_string(), line_count);
        }
    }

    FileMetrics {
        namespace,
        line_count,
        complexity: complexity::calculate(&file.tree, &file.text),
    }
}

/// Metrics for one project: file rows followed by its rollup rows
#[derive(Debug, Clone, Default)]
pub struct ProjectMetrics {
    pub name: String,
    pub rows: Vec<NamespaceMetric>,
    pub total_lines: usize,
    pub file_count: usize,
    pub namespace_lines: BTreeMap<String, usize>,
}

/// Accumulates file metrics for one project
pub struct ProjectAggregator {
    name: String,
    path: String,
    classifier: LineClassifier,
    files: Vec<NamespaceMetric>,
    namespace_lines: BTreeMap<String, usize>,
}

impl ProjectAggregator {
    pub fn new(name: &str, path: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            path: path.to_string(),
            classifier: LineClassifier::new()?,
            files: Vec::new(),
            namespace_lines: BTreeMap::new(),
        })
    }

    pub fn add_file(&mut self, file: &SourceFile) {
        let metrics = analyze_file(file, &mut self.classifier, &mut self.namespace_lines);
        debug!(
            file = %file.display_path(),
            lines = metrics.line_count,
            complexity = metrics.complexity,
            "file analyzed"
        );

        self.files.push(NamespaceMetric {
            scope: MetricScope::File,
            project_name: self.name.clone(),
            project_path: self.path.clone(),
            namespace: metrics.namespace,
            file_name: file.file_name(),
            file_path: file.display_path(),
            line_count: metrics.line_count,
            complexity: metrics.complexity,
            duplicate_lines: 0,
        });
    }

    /// Emit file rows, one Total row per namespace, and the project Total row
    pub fn finish(self) -> ProjectMetrics {
        let ProjectAggregator {
            name,
            path,
            files,
            namespace_lines,
            ..
        } = self;

        let mut namespace_totals: BTreeMap<Option<String>, (usize, usize)> = BTreeMap::new();
        for row in &files {
            let entry = namespace_totals.entry(row.namespace.clone()).or_insert((0, 0));
            entry.0 += row.line_count;
            entry.1 += row.complexity;
        }

        let total_lines: usize = files.iter().map(|r| r.line_count).sum();
        let total_complexity: usize = files.iter().map(|r| r.complexity).sum();
        let file_count = files.len();

        let mut rows = files;
        for (namespace, (lines, complexity)) in namespace_totals {
            rows.push(NamespaceMetric {
                namespace,
                ..total_row(MetricScope::NamespaceTotal, &name, &path, lines, complexity)
            });
        }
        rows.push(total_row(
            MetricScope::ProjectTotal,
            &name,
            &path,
            total_lines,
            total_complexity,
        ));

        ProjectMetrics {
            name,
            rows,
            total_lines,
            file_count,
            namespace_lines,
        }
    }
}

fn total_row(
    scope: MetricScope,
    project_name: &str,
    project_path: &str,
    line_count: usize,
    complexity: usize,
) -> NamespaceMetric {
    NamespaceMetric {
        scope,
        project_name: project_name.to_string(),
        project_path: project_path.to_string(),
        namespace: None,
        file_name: TOTAL_ROW.to_string(),
        file_path: String::new(),
        line_count,
        complexity,
        duplicate_lines: 0,
    }
}

/// The closing solution-wide Total row
pub fn solution_total_row(solution_name: &str, projects: &[ProjectMetrics]) -> NamespaceMetric {
    let line_count = projects.iter().map(|p| p.total_lines).sum();
    let complexity = projects
        .iter()
        .flat_map(|p| p.rows.iter())
        .filter(|r| r.scope == MetricScope::File)
        .map(|r| r.complexity)
        .sum();

    total_row(MetricScope::SolutionTotal, solution_name, "", line_count, complexity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn source_file(path: &str, text: &str) -> SourceFile {
        let mut parser = CSharpParser::new().unwrap();
        SourceFile::from_text(&mut parser, "App", Path::new(path), text.to_string()).unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines_are_not_code() {
        let mut classifier = LineClassifier::new().unwrap();
        assert!(!classifier.is_code(""));
        assert!(!classifier.is_code("    \t"));
        assert!(!classifier.is_code("// just a comment"));
        assert!(!classifier.is_code("/// <summary>Docs</summary>"));
        assert!(!classifier.is_code("/* inline block */"));
        assert!(!classifier.is_code("int x = 1; // trailing comment"));
        assert!(!classifier.is_code("/* opens a block comment"));
    }

    #[test]
    fn test_code_lines() {
        let mut classifier = LineClassifier::new().unwrap();
        assert!(classifier.is_code("int x = 1;"));
        assert!(classifier.is_code("}"));
        assert!(classifier.is_code("{"));
        assert!(classifier.is_code("namespace Foo.Bar"));
        assert!(classifier.is_code(r#"var url = "http://example.com";"#));
    }

    #[test]
    fn test_block_comment_interior_counts_as_code() {
        let mut classifier = LineClassifier::new().unwrap();
        // Line-local classification cannot see the surrounding comment
        assert!(classifier.is_code("   still inside the comment"));
        assert!(classifier.is_code(" * bulleted comment body"));
    }

    #[test]
    fn test_namespace_declared_on() {
        assert_eq!(namespace_declared_on("namespace Foo.Bar"), Some(Some("Foo.Bar".to_string())));
        assert_eq!(namespace_declared_on("  namespace Foo {"), Some(Some("Foo".to_string())));
        assert_eq!(namespace_declared_on("namespace Foo{"), Some(Some("Foo".to_string())));
        assert_eq!(namespace_declared_on("namespace Foo;"), Some(Some("Foo".to_string())));
        assert_eq!(namespace_declared_on("namespace"), Some(None));
        assert_eq!(namespace_declared_on("using Foo;"), None);
        assert_eq!(namespace_declared_on("namespaces are fun"), None);
    }

    #[test]
    fn test_analyze_file_counts_code_lines() {
        let text = "using System;\n\n// comment\nnamespace A\n{\n    class Foo\n    {\n        void M() { if (true) { } }\n    }\n}\n";
        let file = source_file("/app/Foo.cs", text);
        let mut classifier = LineClassifier::new().unwrap();
        let mut namespace_lines = BTreeMap::new();

        let metrics = analyze_file(&file, &mut classifier, &mut namespace_lines);

        assert_eq!(metrics.namespace.as_deref(), Some("A"));
        assert_eq!(metrics.line_count, 8);
        assert_eq!(metrics.complexity, 2);
        // `using System;` is counted before the namespace is known
        assert_eq!(namespace_lines.get(NO_NAMESPACE), Some(&1));
        assert_eq!(namespace_lines.get("A"), Some(&8));
    }

    #[test]
    fn test_namespace_after_byte_order_mark() {
        let file = source_file("/app/Bom.cs", "\u{FEFF}namespace A\n{\n    class Foo { }\n}\n");
        let mut classifier = LineClassifier::new().unwrap();
        let mut namespace_lines = BTreeMap::new();

        let metrics = analyze_file(&file, &mut classifier, &mut namespace_lines);

        assert_eq!(metrics.namespace.as_deref(), Some("A"));
        assert_eq!(metrics.line_count, 4);
        assert_eq!(namespace_lines.get("A"), Some(&4));
        assert!(!namespace_lines.contains_key(NO_NAMESPACE));
    }

    #[test]
    fn test_only_first_namespace_is_honored() {
        let text = "namespace A\n{\n}\nnamespace B\n{\n}\n";
        let file = source_file("/app/Two.cs", text);
        let mut classifier = LineClassifier::new().unwrap();
        let mut namespace_lines = BTreeMap::new();

        let metrics = analyze_file(&file, &mut classifier, &mut namespace_lines);

        assert_eq!(metrics.namespace.as_deref(), Some("A"));
        assert!(!namespace_lines.contains_key("B"));
        assert_eq!(namespace_lines.get("A"), Some(&6));
    }

    #[test]
    fn test_namespace_lines_are_overwritten_not_summed() {
        let first = source_file("/app/One.cs", "namespace A\n{\n    class One { }\n}\n");
        let second = source_file("/app/Two.cs", "namespace A\n{\n}\n");
        let mut classifier = LineClassifier::new().unwrap();
        let mut namespace_lines = BTreeMap::new();

        analyze_file(&first, &mut classifier, &mut namespace_lines);
        analyze_file(&second, &mut classifier, &mut namespace_lines);

        // Last write wins: the second file's running count replaces the first
        assert_eq!(namespace_lines.get("A"), Some(&3));
    }

    #[test]
    fn test_project_rollup_rows() {
        let mut aggregator = ProjectAggregator::new("App", "/app").unwrap();
        aggregator.add_file(&source_file("/app/One.cs", "namespace A\n{\n    class One { }\n}\n"));
        aggregator.add_file(&source_file("/app/Two.cs", "namespace A\n{\n}\n"));
        aggregator.add_file(&source_file("/app/Three.cs", "class Three { }\n"));

        let project = aggregator.finish();

        assert_eq!(project.total_lines, 8);
        assert_eq!(project.file_count, 3);

        let totals: Vec<(&str, usize)> = project
            .rows
            .iter()
            .filter(|r| r.scope == MetricScope::NamespaceTotal)
            .map(|r| (r.namespace_display(), r.line_count))
            .collect();
        assert_eq!(totals, vec![(NO_NAMESPACE, 1), ("A", 7)]);

        let last = project.rows.last().unwrap();
        assert_eq!(last.scope, MetricScope::ProjectTotal);
        assert_eq!(last.file_name, TOTAL_ROW);
        assert_eq!(last.line_count, 8);
        assert_eq!(last.complexity, 3);
    }

    #[test]
    fn test_empty_project_has_only_project_total() {
        let project = ProjectAggregator::new("Empty", "/empty").unwrap().finish();
        assert_eq!(project.total_lines, 0);
        assert_eq!(project.rows.len(), 1);
        assert_eq!(project.rows[0].scope, MetricScope::ProjectTotal);
    }

    #[test]
    fn test_solution_total_row() {
        let mut aggregator = ProjectAggregator::new("App", "/app").unwrap();
        aggregator.add_file(&source_file("/app/One.cs", "class One { void M() { } }\n"));
        let projects = vec![aggregator.finish()];

        let row = solution_total_row("Demo", &projects);

        assert_eq!(row.scope, MetricScope::SolutionTotal);
        assert_eq!(row.line_count, 1);
        assert_eq!(row.complexity, 1);
    }
}
