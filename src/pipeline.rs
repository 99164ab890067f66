//! Whole-solution analysis
//!
//! Files are loaded and parsed once, up front, in parallel. The metrics pass
//! (projects in parallel, files in order within a project) runs alongside the
//! duplication pass; the dependency pass follows. Results are merged into a
//! single [`AnalysisReport`].

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::path::PathBuf;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{AnalysisConfig, ParseFailurePolicy};
use crate::dependencies;
use crate::duplication;
use crate::error::{AnalyzerError, Result};
use crate::metrics::{solution_total_row, ProjectAggregator, ProjectMetrics};
use crate::report::{apply_duplicate_lines, AnalysisReport};
use crate::solution::{collect_sources, Project, Solution};
use crate::source::SourceFile;
use crate::syntax::CSharpParser;

/// Parsed sources of a solution, grouped by project
struct LoadedSources<'a> {
    files: Vec<SourceFile>,
    /// One contiguous range of `files` per project, in solution order
    projects: Vec<(&'a Project, Range<usize>)>,
    skipped: Vec<String>,
}

impl LoadedSources<'_> {
    fn of(&self, index: usize) -> (&Project, &[SourceFile]) {
        let (project, range) = &self.projects[index];
        (project, &self.files[range.clone()])
    }
}

/// Analyze every project of a solution
pub fn analyze(solution: &Solution, config: &AnalysisConfig) -> Result<AnalysisReport> {
    info!(
        solution = %solution.name,
        projects = solution.projects.len(),
        "analyzing solution"
    );

    let sources = load_sources(solution, config)?;

    let (projects, groups) = rayon::join(
        || project_metrics(&sources),
        || {
            if config.detect_duplicates {
                duplication::detect(&sources.files)
            } else {
                Vec::new()
            }
        },
    );
    let projects = projects?;

    let relations = if config.resolve_dependencies {
        dependencies::analyze(&sources.files)
    } else {
        Vec::new()
    };

    let mut metrics: Vec<_> = projects.iter().flat_map(|p| p.rows.iter().cloned()).collect();
    metrics.push(solution_total_row(&solution.name, &projects));

    let duplications = duplication::flatten(&groups);
    apply_duplicate_lines(&mut metrics, &duplications);

    let mut project_totals = BTreeMap::new();
    let mut namespace_lines = BTreeMap::new();
    for project in &projects {
        *project_totals.entry(project.name.clone()).or_insert(0) += project.total_lines;
        namespace_lines.insert(project.name.clone(), project.namespace_lines.clone());
    }

    let report = AnalysisReport {
        solution_name: solution.name.clone(),
        metrics,
        project_totals,
        namespace_lines,
        total_lines: projects.iter().map(|p| p.total_lines).sum(),
        total_files: projects.iter().map(|p| p.file_count).sum(),
        duplication_groups: groups,
        duplications,
        dependencies: relations,
        skipped_files: sources.skipped,
    };

    info!(
        files = report.total_files,
        lines = report.total_lines,
        duplicate_groups = report.duplication_groups.len(),
        relations = report.dependencies.len(),
        "analysis finished"
    );
    Ok(report)
}

fn project_metrics(sources: &LoadedSources) -> Result<Vec<ProjectMetrics>> {
    (0..sources.projects.len())
        .into_par_iter()
        .map(|index| {
            let (project, files) = sources.of(index);
            let mut aggregator = ProjectAggregator::new(&project.name, &project.dir_display())?;
            for file in files {
                aggregator.add_file(file);
            }
            Ok(aggregator.finish())
        })
        .collect()
}

/// Enumerate source files, each paired with the one project that owns it.
///
/// A file under a nested project's directory is owned by the innermost
/// project, so it is loaded and counted once.
fn assign_owners(solution: &Solution, config: &AnalysisConfig) -> Vec<(usize, PathBuf)> {
    let depth = |index: usize| solution.projects[index].dir.components().count();

    let mut owners: HashMap<PathBuf, usize> = HashMap::new();
    for (index, project) in solution.projects.iter().enumerate() {
        for path in collect_sources(&project.dir, config) {
            owners
                .entry(path)
                .and_modify(|owner| {
                    if depth(index) > depth(*owner) {
                        *owner = index;
                    }
                })
                .or_insert(index);
        }
    }

    let mut paths: Vec<(usize, PathBuf)> = owners
        .into_iter()
        .map(|(path, index)| (index, path))
        .collect();
    paths.sort();
    paths
}

/// Read and parse every source file, applying the parse-failure policy
fn load_sources<'a>(solution: &'a Solution, config: &AnalysisConfig) -> Result<LoadedSources<'a>> {
    let paths = assign_owners(solution, config);

    let errors = Mutex::new(Vec::new());
    let skipped = Mutex::new(Vec::new());

    let loaded: Vec<Option<SourceFile>> = paths
        .par_iter()
        .map_init(CSharpParser::new, |parser, (index, path)| {
            let project = &solution.projects[*index].name;
            let outcome = match parser {
                Ok(parser) => SourceFile::load(parser, project, path),
                Err(err) => Err(AnalyzerError::Language {
                    message: err.to_string(),
                }),
            };
            match outcome {
                Ok(file) => Some(file),
                Err(AnalyzerError::Parse { path, message })
                    if config.parse_failures == ParseFailurePolicy::Skip =>
                {
                    warn!(file = %path, reason = %message, "skipping file that failed to parse");
                    skipped.lock().push(path);
                    None
                }
                Err(err) => {
                    errors.lock().push(err);
                    None
                }
            }
        })
        .collect();

    if let Some(err) = AnalyzerError::aggregate(errors.into_inner()) {
        return Err(err);
    }

    let mut files = Vec::with_capacity(loaded.len());
    let mut ranges: Vec<Range<usize>> = vec![0..0; solution.projects.len()];
    for ((index, _), file) in paths.iter().zip(loaded) {
        if let Some(file) = file {
            let range = &mut ranges[*index];
            if range.is_empty() {
                *range = files.len()..files.len();
            }
            files.push(file);
            range.end = files.len();
        }
    }

    let mut skipped = skipped.into_inner();
    skipped.sort();

    Ok(LoadedSources {
        files,
        projects: solution.projects.iter().zip(ranges).collect(),
        skipped,
    })
}
