//! Corpus-wide identifier catalog.
//!
//! Pass 1 of a run scans every document with [`list_ids`] and feeds the result into a
//! [`CatalogBuilder`]. [`CatalogBuilder::finish`] freezes the result into an [`IdCatalog`],
//! which only offers read access and is what the rewriting passes consume.

use crate::{cleanup::sanitize_id, diagnostic::Diagnostic, dom::Document};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Root tags of documents that count as topics.
pub const TOPIC_TAGS: [&str; 4] = ["concept", "reference", "task", "topic"];

/// Leading character of identifiers produced by tooling rather than by an author.
pub const GENERATED_ID_MARKER: char = '_';

/// Separator between a stable identifier and a generated suffix (`section_abc123`).
pub const GENERATED_ID_SEPARATOR: char = '_';

pub const ID_ATTR: &str = "id";

pub fn is_topic(doc: &Document) -> bool {
    TOPIC_TAGS.contains(&doc.root_tag())
}

/// Identifiers defined in `doc`, the topic id first.
///
/// Index 0 is the root's `id`, or the empty string when the root has none. The remaining
/// entries follow document order and leave out generated identifiers. Documents whose root is
/// not a topic yield an empty list.
pub fn list_ids(doc: &Document) -> Vec<String> {
    if !is_topic(doc) {
        return Vec::new();
    }
    let root = doc.root();
    let mut result = vec![doc.attr(root, ID_ATTR).unwrap_or_default().to_string()];

    for id in doc.elements().into_iter().skip(1) {
        if !doc.has_attributes(id) {
            continue;
        }
        let Some(value) = doc.attr(id, ID_ATTR) else {
            continue;
        };
        if !value.starts_with(GENERATED_ID_MARKER) {
            result.push(value.to_string());
        }
    }
    result
}

/// Where an identifier is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Id of the topic containing the identifier; empty when the topic has none.
    pub topic_id: String,
    pub path: PathBuf,
}

/// Accumulates per-document identifier lists. First definition wins.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeMap<String, CatalogEntry>,
    sanitize: bool,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register identifiers in the form [`sanitize_id`] leaves them, so that references
    /// resolve to ids that still exist once the sanitizer has run in the same pass.
    pub fn sanitize_ids(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    fn key(&self, id: &str) -> String {
        if self.sanitize {
            sanitize_id(id).unwrap_or_else(|| id.to_string())
        } else {
            id.to_string()
        }
    }

    /// Register the identifiers of the document at `path`.
    ///
    /// `ids` is a list as returned by [`list_ids`]. Identifiers already in the catalog are not
    /// replaced; each such clash is returned as a duplicate identifier diagnostic against
    /// `path`. The empty topic id sentinel is never registered, nor is an id that sanitizes to
    /// nothing.
    pub fn add_document(&mut self, path: &Path, ids: &[String]) -> Vec<Diagnostic> {
        let mut conflicts = Vec::new();
        let Some(topic_id) = ids.first().map(|id| self.key(id)) else {
            return conflicts;
        };
        let keys: Vec<String> = ids.iter().map(|id| self.key(id)).collect();
        for id in keys.iter().filter(|id| !id.is_empty()) {
            if self.entries.contains_key(id) {
                tracing::debug!(
                    "[CatalogBuilder] {id} in {path:?} already defined in {:?}",
                    self.entries[id].path
                );
                conflicts.push(Diagnostic::duplicate_id(path, id.as_str()));
                continue;
            }
            self.entries.insert(
                id.clone(),
                CatalogEntry {
                    topic_id: topic_id.clone(),
                    path: path.to_path_buf(),
                },
            );
        }
        conflicts
    }

    /// Scan `doc` and register its identifiers in one step.
    pub fn add(&mut self, path: &Path, doc: &Document) -> Vec<Diagnostic> {
        let ids = list_ids(doc);
        self.add_document(path, &ids)
    }

    pub fn finish(self) -> IdCatalog {
        tracing::debug!("[CatalogBuilder] catalog complete: {} ids", self.entries.len());
        IdCatalog {
            entries: self.entries,
        }
    }
}

/// Read-only identifier catalog for a whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl IdCatalog {
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Catalog keys that `identifier` refers to: an exact match, or a key followed by the
    /// generated-id separator at the start of `identifier`. Sorted by key.
    pub fn find_matches(&self, identifier: &str) -> Vec<&str> {
        self.ids()
            .filter(|key| {
                identifier == *key
                    || identifier
                        .strip_prefix(key)
                        .is_some_and(|rest| rest.starts_with(GENERATED_ID_SEPARATOR))
            })
            .collect()
    }
}
