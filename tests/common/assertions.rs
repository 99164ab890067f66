//! Report assertions shared by the integration tests

use solution_metrics::{AnalysisReport, MetricScope, NamespaceMetric};

/// File rows of a report, in report order
pub fn file_rows(report: &AnalysisReport) -> Vec<&NamespaceMetric> {
    report.file_metrics().collect()
}

/// The single row with the given scope and namespace
pub fn total_row<'a>(
    report: &'a AnalysisReport,
    scope: MetricScope,
    namespace: Option<&str>,
) -> &'a NamespaceMetric {
    let rows: Vec<&NamespaceMetric> = report
        .metrics
        .iter()
        .filter(|m| m.scope == scope && m.namespace.as_deref() == namespace)
        .collect();
    assert_eq!(rows.len(), 1, "expected one {scope:?} row for {namespace:?}, got {rows:#?}");
    rows[0]
}

/// Relations as `(source, target)` pairs
pub fn edges(report: &AnalysisReport) -> Vec<(&str, &str)> {
    report
        .dependencies
        .iter()
        .map(|r| (r.source.as_str(), r.target.as_str()))
        .collect()
}

/// Every group has at least two members and each record belongs to a group
pub fn assert_groups_well_formed(report: &AnalysisReport) {
    for group in &report.duplication_groups {
        assert!(group.members.len() >= 2, "singleton group {group:#?}");
        assert!(group.members.iter().all(|m| m.hash == group.hash));
    }
    let members: usize = report.duplication_groups.iter().map(|g| g.members.len()).sum();
    assert_eq!(members, report.duplications.len());
}
