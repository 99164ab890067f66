//! Solution metrics: static analysis for C# solutions
//!
//! Every project in a `.sln` manifest is parsed with tree-sitter and measured
//! four ways:
//!
//! - code lines per file, rolled up per namespace, project and solution
//! - cyclomatic complexity per method-like unit
//! - duplicated method blocks across the whole solution
//! - a class-level dependency graph resolved through `using` directives
//!
//! # Example
//!
//! ```ignore
//! use solution_metrics::{analyze, AnalysisConfig, Solution};
//!
//! let solution = Solution::from_manifest("Shop.sln")?;
//! let report = analyze(&solution, &AnalysisConfig::default())?;
//! println!("{} code lines in {} files", report.total_lines, report.total_files);
//! ```

pub mod cli;
pub mod complexity;
pub mod config;
pub mod dependencies;
pub mod duplication;
pub mod error;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod solution;
pub mod source;
pub mod syntax;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use complexity::{UnitComplexity, UnitKind};
pub use config::{AnalysisConfig, ParseFailurePolicy};
pub use dependencies::{DependencyContext, DependencyRelation, DependencyResolver};
pub use duplication::{DuplicationDetector, DuplicationGroup, DuplicationRecord};
pub use error::{AnalyzerError, Result};
pub use metrics::{FileMetrics, ProjectAggregator, ProjectMetrics};
pub use output::{render_json, render_text};
pub use pipeline::analyze;
pub use report::{AnalysisReport, MetricScope, NamespaceMetric};
pub use solution::{Project, Solution};
pub use source::SourceFile;
pub use syntax::{CSharpParser, SyntaxTree};
