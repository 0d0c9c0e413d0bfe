//! Entry and parent rows of a per-crate index table.

use crate::index::signature::FunctionSignature;
use crate::item_type::ItemType;

/// One row of a crate's `i` array, with its delta-encoded path resolved.
///
/// The wire form is the fixed-position array
/// `[kind, name, path, desc, parent_idx, signature]`; absent slots are
/// `null`, and an empty `path` on the wire means "same as the previous row".
/// This struct always carries the resolved path.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub kind: ItemType,
    pub name: String,
    /// Module path of the item (e.g. `unicode_segmentation`). Not the full
    /// item path: the owning type, if any, lives in the parent table.
    pub path: String,
    /// Shortened one-line documentation snippet; empty when undocumented.
    pub desc: String,
    /// Index into the owning crate's parent table.
    pub parent: Option<u32>,
    pub signature: Option<FunctionSignature>,
}

impl IndexEntry {
    /// A minimal entry with no snippet, parent, or signature.
    pub fn new(kind: ItemType, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            desc: String::new(),
            parent: None,
            signature: None,
        }
    }
}

/// One row of a crate's `p` array: an owning type that entries reference by
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parent {
    pub kind: ItemType,
    pub name: String,
}

impl Parent {
    pub fn new(kind: ItemType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}
