//! Report data handed to exporters
//!
//! Everything here is plain data. The JSON and text renderers only read
//! these structures.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dependencies::DependencyRelation;
use crate::duplication::{DuplicationGroup, DuplicationRecord};

/// Display name for files outside any namespace
pub const NO_NAMESPACE: &str = "No Namespace";

/// File name used on synthetic rollup rows
pub const TOTAL_ROW: &str = "Total";

/// What a metrics row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricScope {
    File,
    NamespaceTotal,
    ProjectTotal,
    SolutionTotal,
}

/// One metrics row: a file or a synthetic "Total" rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceMetric {
    pub scope: MetricScope,
    pub project_name: String,
    pub project_path: String,
    /// `None` when the file declares no namespace
    pub namespace: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub line_count: usize,
    pub complexity: usize,
    /// Filled in by [`apply_duplicate_lines`]
    pub duplicate_lines: usize,
}

impl NamespaceMetric {
    /// Namespace name as shown to users
    pub fn namespace_display(&self) -> &str {
        self.namespace.as_deref().unwrap_or(NO_NAMESPACE)
    }

    pub fn is_total(&self) -> bool {
        self.scope != MetricScope::File
    }
}

/// Solution-wide analysis result
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub solution_name: String,
    pub metrics: Vec<NamespaceMetric>,
    /// Project name -> code lines
    pub project_totals: BTreeMap<String, usize>,
    /// Project name -> namespace -> last running code-line count written
    /// while scanning that project's files
    pub namespace_lines: BTreeMap<String, BTreeMap<String, usize>>,
    pub total_lines: usize,
    pub total_files: usize,
    pub duplication_groups: Vec<DuplicationGroup>,
    pub duplications: Vec<DuplicationRecord>,
    pub dependencies: Vec<DependencyRelation>,
    /// Files excluded because they failed to parse
    pub skipped_files: Vec<String>,
}

impl AnalysisReport {
    /// File rows only, without synthetic totals
    pub fn file_metrics(&self) -> impl Iterator<Item = &NamespaceMetric> {
        self.metrics.iter().filter(|m| m.scope == MetricScope::File)
    }
}

/// Cross-reference duplication records into the metrics rows.
///
/// A file row's duplicate-line count becomes the sum of the line counts of
/// all duplication records in that file. Total rows are then recomputed from
/// the file rows they cover.
pub fn apply_duplicate_lines(metrics: &mut [NamespaceMetric], duplications: &[DuplicationRecord]) {
    let mut per_file: HashMap<&str, usize> = HashMap::new();
    for record in duplications {
        *per_file.entry(record.file_path.as_str()).or_insert(0) += record.line_count;
    }

    let mut per_namespace: HashMap<(String, Option<String>), usize> = HashMap::new();
    let mut per_project: HashMap<String, usize> = HashMap::new();
    let mut solution = 0;

    for metric in metrics.iter_mut().filter(|m| m.scope == MetricScope::File) {
        metric.duplicate_lines = per_file.get(metric.file_path.as_str()).copied().unwrap_or(0);
        *per_namespace
            .entry((metric.project_name.clone(), metric.namespace.clone()))
            .or_insert(0) += metric.duplicate_lines;
        *per_project.entry(metric.project_name.clone()).or_insert(0) += metric.duplicate_lines;
        solution += metric.duplicate_lines;
    }

    for metric in metrics.iter_mut() {
        metric.duplicate_lines = match metric.scope {
            MetricScope::File => continue,
            MetricScope::NamespaceTotal => per_namespace
                .get(&(metric.project_name.clone(), metric.namespace.clone()))
                .copied()
                .unwrap_or(0),
            MetricScope::ProjectTotal => per_project.get(&metric.project_name).copied().unwrap_or(0),
            MetricScope::SolutionTotal => solution,
        };
    }
}
