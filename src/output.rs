//! Report rendering for the command line

use std::fmt::Display;

use crate::error::Result;
use crate::report::{AnalysisReport, MetricScope};

/// Pretty-printed JSON of the whole report
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Plain-text summary: metrics table, duplication groups, dependency edges
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("solution: {}\n", report.solution_name));
    out.push_str(&format!(
        "files: {}  lines: {}  projects: {}\n",
        report.total_files,
        report.total_lines,
        report.project_totals.len()
    ));
    if !report.skipped_files.is_empty() {
        out.push_str(&format!("skipped (parse errors): {}\n", report.skipped_files.len()));
        for path in &report.skipped_files {
            out.push_str(&format!("  {}\n", path));
        }
    }

    out.push_str("\nmetrics:\n");
    out.push_str(&metrics_line("project", "namespace", "file", "lines", "cc", "dup"));
    for row in &report.metrics {
        let namespace = match row.scope {
            MetricScope::ProjectTotal | MetricScope::SolutionTotal => "",
            MetricScope::File | MetricScope::NamespaceTotal => row.namespace_display(),
        };
        out.push_str(&metrics_line(
            &row.project_name,
            namespace,
            &row.file_name,
            row.line_count,
            row.complexity,
            row.duplicate_lines,
        ));
    }

    out.push_str(&format!("\nduplicates: {} groups\n", report.duplication_groups.len()));
    for group in &report.duplication_groups {
        out.push_str(&format!(
            "  {} ({})\n",
            group.key,
            &group.hash[..group.hash.len().min(12)]
        ));
        for member in &group.members {
            out.push_str(&format!(
                "    {}:{} {} ({} lines)\n",
                member.file_path, member.start_line, member.method_name, member.line_count
            ));
        }
    }

    out.push_str(&format!("\ndependencies: {}\n", report.dependencies.len()));
    for relation in &report.dependencies {
        out.push_str(&format!("  {} -> {}\n", relation.source, relation.target));
    }

    out
}

fn metrics_line(
    project: &str,
    namespace: &str,
    file: &str,
    lines: impl Display,
    complexity: impl Display,
    duplicates: impl Display,
) -> String {
    format!(
        "  {:<20} {:<28} {:<24} {:>7} {:>5} {:>5}\n",
        project,
        namespace,
        file,
        lines.to_string(),
        complexity.to_string(),
        duplicates.to_string()
    )
}
