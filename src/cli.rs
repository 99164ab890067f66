//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{AnalysisConfig, ParseFailurePolicy};

/// Line, complexity, duplication and dependency metrics for C# solutions
#[derive(Parser, Debug)]
#[command(name = "solution-metrics")]
#[command(version)]
pub struct Cli {
    /// Solution manifest (.sln) or a single project file (.csproj)
    #[arg(value_name = "SOLUTION", env = "SOLUTION_METRICS_PATH")]
    pub solution: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum, env = "SOLUTION_METRICS_FORMAT")]
    pub format: OutputFormat,

    /// Fail the run instead of skipping files that do not parse
    #[arg(long, env = "SOLUTION_METRICS_STRICT")]
    pub strict: bool,

    /// Extra directory names to skip (bin, obj and hidden directories are always skipped)
    #[arg(long = "exclude", value_name = "DIR", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Skip duplicate detection
    #[arg(long)]
    pub no_duplicates: bool,

    /// Skip dependency resolution
    #[arg(long)]
    pub no_dependencies: bool,

    /// Debug-level logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// The full report as JSON
    Json,
}

impl Cli {
    /// Analysis settings selected by the flags
    pub fn config(&self) -> AnalysisConfig {
        let policy = if self.strict {
            ParseFailurePolicy::Abort
        } else {
            ParseFailurePolicy::Skip
        };

        AnalysisConfig {
            detect_duplicates: !self.no_duplicates,
            resolve_dependencies: !self.no_dependencies,
            ..AnalysisConfig::default()
        }
        .with_parse_failures(policy)
        .exclude(self.exclude.iter().cloned())
    }

    /// Default log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["solution-metrics", "App.sln"]).unwrap();
        let config = cli.config();

        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(config.parse_failures, ParseFailurePolicy::Skip);
        assert!(config.detect_duplicates);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_flags_reach_config() {
        let cli = Cli::try_parse_from([
            "solution-metrics",
            "App.sln",
            "--format",
            "json",
            "--strict",
            "--exclude",
            "packages,TestResults",
            "--no-dependencies",
            "-v",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(config.parse_failures, ParseFailurePolicy::Abort);
        assert!(config.is_excluded_dir("packages"));
        assert!(config.is_excluded_dir("TestResults"));
        assert!(!config.resolve_dependencies);
        assert_eq!(cli.log_level(), "debug");
    }
}
