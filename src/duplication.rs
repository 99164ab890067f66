//! Duplicate code detection over method-body blocks
//!
//! Every block inside every method (the body and each nested block) is a
//! fragment. Fragments are normalized by dropping all whitespace and hashed
//! with SHA-256. Fragments that share a hash form a duplication group.
//!
//! Each hash moves through `absent -> pending(one location) -> grouped(>= 2)`.
//! The transition runs under the shard lock of the concurrent map entry, so
//! workers recording the same hash at the same time never lose an update.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use tree_sitter::Node;

use crate::source::SourceFile;
use crate::syntax::{line_span, node_text, start_line, visit_all};

/// One occurrence of a duplicated fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DuplicationRecord {
    /// SHA-256 of the normalized fragment, hex encoded
    pub hash: String,
    pub file_path: String,
    pub method_name: String,
    /// 1-based line where the block starts
    pub start_line: usize,
    pub line_count: usize,
}

/// Fragments sharing one hash; always at least two members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicationGroup {
    pub hash: String,
    /// `file:method` of the first member in path order
    pub key: String,
    pub members: Vec<DuplicationRecord>,
}

#[derive(Debug, Clone)]
struct Location {
    file_path: String,
    method_name: String,
    start_line: usize,
    line_count: usize,
}

#[derive(Debug)]
enum FragmentState {
    Pending(Location),
    Grouped(Vec<Location>),
}

/// A block extracted from a method, ready to hash
struct Fragment {
    start_line: usize,
    line_count: usize,
    text: String,
}

struct MethodFragments {
    name: String,
    blocks: Vec<Fragment>,
}

/// Shared hash -> state map filled by any number of workers
#[derive(Debug, Default)]
pub struct DuplicationDetector {
    fragments: DashMap<String, FragmentState>,
}

impl DuplicationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash every method block of a file, one worker per method
    pub fn add_file(&self, file: &SourceFile) {
        let file_path = file.display_path();
        let methods = extract_methods(&file.tree.root(), &file.text);
        debug!(file = %file_path, methods = methods.len(), "hashing method blocks");

        methods.par_iter().for_each(|method| {
            for block in &method.blocks {
                let hash = fingerprint(&normalize(&block.text));
                self.record(
                    hash,
                    Location {
                        file_path: file_path.clone(),
                        method_name: method.name.clone(),
                        start_line: block.start_line,
                        line_count: block.line_count,
                    },
                );
            }
        });
    }

    fn record(&self, hash: String, location: Location) {
        match self.fragments.entry(hash) {
            Entry::Vacant(vacant) => {
                vacant.insert(FragmentState::Pending(location));
            }
            Entry::Occupied(mut occupied) => {
                let state = occupied.get_mut();
                match state {
                    FragmentState::Pending(first) => {
                        let first = first.clone();
                        *state = FragmentState::Grouped(vec![first, location]);
                    }
                    FragmentState::Grouped(members) => members.push(location),
                }
            }
        }
    }

    /// Groups with two or more members, sorted by key then hash
    pub fn into_groups(self) -> Vec<DuplicationGroup> {
        let mut groups: Vec<DuplicationGroup> = self
            .fragments
            .into_iter()
            .filter_map(|(hash, state)| match state {
                FragmentState::Pending(_) => None,
                FragmentState::Grouped(members) => {
                    let mut members: Vec<DuplicationRecord> = members
                        .into_iter()
                        .map(|loc| DuplicationRecord {
                            hash: hash.clone(),
                            file_path: loc.file_path,
                            method_name: loc.method_name,
                            start_line: loc.start_line,
                            line_count: loc.line_count,
                        })
                        .collect();
                    members.sort_by(|a, b| {
                        (&a.file_path, a.start_line, &a.method_name)
                            .cmp(&(&b.file_path, b.start_line, &b.method_name))
                    });
                    let key = format!("{}:{}", members[0].file_path, members[0].method_name);
                    Some(DuplicationGroup { hash, key, members })
                }
            })
            .collect();

        groups.sort_by(|a, b| (&a.key, &a.hash).cmp(&(&b.key, &b.hash)));
        groups
    }
}

/// Detect duplicated blocks across all files, one worker per file
pub fn detect(files: &[SourceFile]) -> Vec<DuplicationGroup> {
    let detector = DuplicationDetector::new();
    files.par_iter().for_each(|file| detector.add_file(file));
    let groups = detector.into_groups();
    debug!(groups = groups.len(), "duplication pass finished");
    groups
}

/// Flatten groups into records, keeping group order
pub fn flatten(groups: &[DuplicationGroup]) -> Vec<DuplicationRecord> {
    groups.iter().flat_map(|g| g.members.iter().cloned()).collect()
}

/// Drop every whitespace character, keeping everything else in order
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Hex-encoded SHA-256 of a normalized fragment
pub fn fingerprint(normalized: &str) -> String {
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

fn extract_methods(root: &Node, source: &str) -> Vec<MethodFragments> {
    let mut methods = Vec::new();
    visit_all(root, |node| {
        if node.kind() != "method_declaration" {
            return;
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source).to_string())
            .unwrap_or_default();

        let mut blocks = Vec::new();
        visit_all(node, |inner| {
            if inner.kind() == "block" {
                blocks.push(Fragment {
                    start_line: start_line(inner),
                    line_count: line_span(inner),
                    text: node_text(inner, source).to_string(),
                });
            }
        });

        methods.push(MethodFragments { name, blocks });
    });
    methods
}
