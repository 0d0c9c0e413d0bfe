//! The resolved search index data model.
//!
//! A [`SearchIndex`] maps crate names to their entry tables. It is produced
//! either by parsing an existing artifact ([`SearchIndex::parse_str`]) or by
//! the programmatic [`IndexBuilder`](crate::builder::IndexBuilder), and is
//! immutable from the search engine's point of view: the engine only ever
//! borrows it.

pub(crate) mod entry;
pub(crate) mod signature;

pub use entry::{IndexEntry, Parent};
pub use signature::{FunctionSignature, TypeName};

use crate::error::Result;
use crate::item_type::ItemType;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// The entry tables of a single crate: the `{doc, i, p}` record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrateEntries {
    /// Top-level crate documentation snippet.
    pub doc: String,
    /// Entry rows in generator traversal order.
    pub entries: Vec<IndexEntry>,
    /// Owning types referenced by entry rows.
    pub parents: Vec<Parent>,
}

impl CrateEntries {
    /// Resolve an entry's parent reference against this crate's parent table.
    pub fn parent_of(&self, entry: &IndexEntry) -> Option<&Parent> {
        self.parents.get(entry.parent? as usize)
    }

    /// The name shown for an entry, qualified by its owning type when it has
    /// one (`GraphemeCursor::next_boundary`).
    pub fn qualified_name(&self, entry: &IndexEntry) -> String {
        match self.parent_of(entry) {
            Some(parent) => format!("{}::{}", parent.name, entry.name),
            None => entry.name.clone(),
        }
    }

    /// The full display path: module path, owning type, then name.
    pub fn display_path(&self, entry: &IndexEntry) -> String {
        let qualified = self.qualified_name(entry);
        if entry.path.is_empty() {
            qualified
        } else {
            format!("{}::{}", entry.path, qualified)
        }
    }

    /// Entry counts per kind, in kind-code order.
    pub fn counts_by_kind(&self) -> BTreeMap<ItemType, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// A full search index: every crate the documentation site knows about.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchIndex {
    crates: BTreeMap<String, CrateEntries>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an artifact from source text and resolve it into the typed
    /// model. Fails on syntax errors and on out-of-bounds references; use
    /// [`validate`](crate::validate::validate) for a full diagnostic report.
    pub fn parse_str(source: &str) -> Result<Self> {
        let raw = crate::parse::parse_artifact(source)?;
        Ok(crate::parse::resolve(&raw)?)
    }

    /// Read and parse an artifact file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read search index at {}", path.display()))?;
        Self::parse_str(&source)
            .with_context(|| format!("failed to parse search index at {}", path.display()))
    }

    /// Insert a crate's tables, replacing any previous tables under the same
    /// name (assignment semantics of the artifact).
    pub fn insert_crate(&mut self, name: impl Into<String>, entries: CrateEntries) {
        self.crates.insert(name.into(), entries);
    }

    pub fn get(&self, crate_name: &str) -> Option<&CrateEntries> {
        self.crates.get(crate_name)
    }

    /// Crate names in sorted order, the list the widget's crate dropdown
    /// was populated from.
    pub fn crate_names(&self) -> Vec<&str> {
        self.crates.keys().map(String::as_str).collect()
    }

    /// Iterate crates in sorted name order.
    pub fn crates(&self) -> impl Iterator<Item = (&str, &CrateEntries)> {
        self.crates.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.crates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }

    /// Total entry rows across all crates.
    pub fn entry_count(&self) -> usize {
        self.crates.values().map(|c| c.entries.len()).sum()
    }
}
