//! Programmatic index construction.
//!
//! [`IndexBuilder`] produces a [`SearchIndex`] without going through artifact
//! text, the way the documentation generator originally populated the table:
//! one crate at a time, rows appended in traversal order, owning types
//! registered up front so member rows can point at them.
//!
//! ```
//! use rustdoc_index::builder::IndexBuilder;
//! use rustdoc_index::item_type::ItemType;
//!
//! let mut builder = IndexBuilder::new();
//! let mut demo = builder.crate_entries("demo", "A demonstration crate.");
//! let stack = demo.add_parent(ItemType::Struct, "Stack");
//! demo.add_item(ItemType::Struct, "Stack", "demo", "A LIFO container.");
//! demo.add_item(ItemType::Method, "pop", "demo", "Removes the top element.")
//!     .parent(stack)?;
//! demo.finish();
//! let index = builder.finish();
//! # assert_eq!(index.entry_count(), 2);
//! # Ok::<(), rustdoc_index::error::BuildError>(())
//! ```

use crate::error::BuildError;
use crate::index::{CrateEntries, FunctionSignature, IndexEntry, Parent, SearchIndex, TypeName};
use crate::item_type::ItemType;
use crate::summary::summarize;

/// Accumulates crates into a [`SearchIndex`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: SearchIndex,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a builder for one crate's entry tables.
    ///
    /// `top_doc` is the crate's full root documentation; it is reduced to a
    /// snippet the same way item docs are. The crate is committed by
    /// [`CrateBuilder::finish`]; opening the same name twice replaces the
    /// earlier tables.
    pub fn crate_entries(&mut self, name: impl Into<String>, top_doc: &str) -> CrateBuilder<'_> {
        CrateBuilder {
            name: name.into(),
            entries: CrateEntries {
                doc: summarize(top_doc),
                entries: Vec::new(),
                parents: Vec::new(),
            },
            index: &mut self.index,
        }
    }

    pub fn finish(self) -> SearchIndex {
        self.index
    }
}

/// Builds the entry tables of a single crate.
#[derive(Debug)]
pub struct CrateBuilder<'a> {
    name: String,
    entries: CrateEntries,
    index: &'a mut SearchIndex,
}

impl CrateBuilder<'_> {
    /// Register an owning type and return the index member rows use to point
    /// back at it.
    pub fn add_parent(&mut self, kind: ItemType, name: impl Into<String>) -> u32 {
        let index = self.entries.parents.len() as u32;
        self.entries.parents.push(Parent::new(kind, name));
        index
    }

    /// Append an entry row. `path` is the full module path (the emitter takes
    /// care of delta compression); `docs` is the item's full documentation,
    /// reduced here to its desc snippet. The returned [`Row`] attaches the
    /// optional parts.
    pub fn add_item(
        &mut self,
        kind: ItemType,
        name: impl Into<String>,
        path: impl Into<String>,
        docs: &str,
    ) -> Row<'_> {
        let mut entry = IndexEntry::new(kind, name, path);
        entry.desc = summarize(docs);
        let slot = self.entries.entries.len();
        self.entries.entries.push(entry);
        Row {
            entry: &mut self.entries.entries[slot],
            parent_len: self.entries.parents.len(),
        }
    }

    /// Commit the crate to the index.
    pub fn finish(self) {
        let Self {
            name,
            entries,
            index,
        } = self;
        index.insert_crate(name, entries);
    }
}

/// A just-appended entry row; attaches the parent reference and signature.
#[derive(Debug)]
pub struct Row<'a> {
    entry: &'a mut IndexEntry,
    parent_len: usize,
}

impl Row<'_> {
    /// Point the row at an owning type registered with
    /// [`CrateBuilder::add_parent`]. Indices past the end of the parent table
    /// are rejected, so a committed crate always resolves.
    pub fn parent(self, index: u32) -> Result<Self, BuildError> {
        if (index as usize) < self.parent_len {
            self.entry.parent = Some(index);
            Ok(self)
        } else {
            Err(BuildError::ParentOutOfBounds {
                index,
                len: self.parent_len,
            })
        }
    }

    /// Attach a searchable signature. Type names and generic arguments are
    /// lowercased on entry, matching what the generator wrote.
    pub fn signature(self, inputs: Vec<TypeName>, output: Vec<TypeName>) -> Self {
        self.entry.signature = Some(FunctionSignature::new(
            inputs.into_iter().map(lowered).collect(),
            output.into_iter().map(lowered).collect(),
        ));
        self
    }
}

fn lowered(ty: TypeName) -> TypeName {
    TypeName {
        name: ty.name.to_lowercase(),
        generics: ty.generics.into_iter().map(|g| g.to_lowercase()).collect(),
    }
}
