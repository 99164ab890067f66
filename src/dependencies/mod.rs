//! Class-level dependency graph
//!
//! Resolution is two-phase. Every file contributes its declarations to a
//! shared catalog first; only once the catalog is frozen are references
//! resolved against it. The phases are separate types, so resolving against
//! a partial catalog does not compile:
//!
//! ```text
//! DependencyContext --collect()--> --into_resolver()--> DependencyResolver --resolve()-->
//!        ^                                                      |
//!        +--------------------------- reset() ------------------+
//! ```

mod catalog;
mod references;
mod resolve;

pub use catalog::{declarations_in, CatalogBuilder, ClassCatalog, TypeDeclaration};
pub use references::{extract as extract_references, ClassReferences, ImportScope, UsingDirective};
pub use resolve::{resolve_expression, resolve_name, type_names};

use std::collections::HashSet;

use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::source::SourceFile;

/// A directed edge `source -> target` between two cataloged types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DependencyRelation {
    /// Fully-qualified name of the referencing type
    pub source: String,
    /// Fully-qualified name of the referenced type
    pub target: String,
    /// File declaring the source type
    pub file_path: String,
    /// Line of the source type's declaration
    pub line: usize,
}

/// Collection phase: gathers declarations from any number of workers
#[derive(Debug, Default)]
pub struct DependencyContext {
    catalog: CatalogBuilder,
}

impl DependencyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog the declarations of every file, one worker per file
    pub fn collect(&self, files: &[SourceFile]) {
        let found: usize = files.par_iter().map(|file| self.catalog.add_file(file)).sum();
        debug!(files = files.len(), declarations = found, "cataloged type declarations");
    }

    /// Drop every declaration collected so far
    pub fn reset(&mut self) {
        self.catalog = CatalogBuilder::new();
    }

    /// Freeze the catalog and move on to resolution
    pub fn into_resolver(self) -> DependencyResolver {
        DependencyResolver {
            catalog: self.catalog.finish(),
            relations: DashMap::new(),
        }
    }
}

/// Resolution phase: the catalog is read-only from here on
#[derive(Debug)]
pub struct DependencyResolver {
    catalog: ClassCatalog,
    relations: DashMap<String, HashSet<DependencyRelation>>,
}

impl DependencyResolver {
    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Resolve every class in every file.
    ///
    /// References are extracted per file, then each class is resolved as its
    /// own unit of work.
    pub fn resolve(&self, files: &[SourceFile]) {
        let classes: Vec<ClassReferences> =
            files.par_iter().flat_map_iter(references::extract).collect();
        debug!(classes = classes.len(), "resolving class references");
        classes.par_iter().for_each(|class| self.resolve_class(class));
    }

    /// Resolve one class's references and record its outgoing edges
    pub fn resolve_class(&self, class: &ClassReferences) {
        let source = &class.declaration.qualified_name;
        let own_namespace = class.declaration.namespace.as_deref();

        let edges: HashSet<DependencyRelation> = class
            .candidates
            .iter()
            .flat_map(|candidate| {
                resolve_expression(candidate, &class.imports, own_namespace, &self.catalog)
            })
            .filter(|target| target != source)
            .map(|target| DependencyRelation {
                source: source.clone(),
                target,
                file_path: class.declaration.file_path.clone(),
                line: class.declaration.line,
            })
            .collect();

        if !edges.is_empty() {
            self.relations.entry(source.clone()).or_default().extend(edges);
        }
    }

    /// Outgoing edges of one type, sorted
    #[cfg(test)]
    pub(crate) fn relations_of(&self, source: &str) -> Vec<DependencyRelation> {
        let mut edges: Vec<DependencyRelation> = self
            .relations
            .get(source)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        edges.sort();
        edges
    }

    /// All edges, sorted by source then target
    pub fn into_relations(self) -> Vec<DependencyRelation> {
        let mut edges: Vec<DependencyRelation> = self
            .relations
            .into_iter()
            .flat_map(|(_, set)| set)
            .collect();
        edges.sort();
        edges
    }

    /// Discard the catalog and every edge, ready for a new run
    pub fn reset(self) -> DependencyContext {
        DependencyContext::new()
    }
}

/// Run both phases over a set of files
pub fn analyze(files: &[SourceFile]) -> Vec<DependencyRelation> {
    let context = DependencyContext::new();
    context.collect(files);
    let resolver = context.into_resolver();
    resolver.resolve(files);
    let relations = resolver.into_relations();
    debug!(relations = relations.len(), "dependency pass finished");
    relations
}
