//! Shared fixtures for integration tests.
//!
//! # The shipped sample
//!
//! `tests/fixtures/search-index.js` is an artifact produced by a real
//! documentation build: two crates (`trunc` and `unicode_segmentation`),
//! an interning array, delta-compressed paths and the full statement
//! frame. Integration tests parse it, search it and round-trip it, so
//! assertions here are pinned to what that file actually contains.
//!
//! # Filesystem isolation
//!
//! [`TempArtifacts`] gives each CLI test its own temp directory to write
//! artifact files into; it is cleaned up on drop, so tests run in
//! parallel without interference.

use std::path::{Path, PathBuf};

use rstest::fixture;
use rustdoc_index::SearchIndex;
use tempfile::TempDir;

/// The shipped sample artifact, byte for byte.
pub const SAMPLE: &str = include_str!("../fixtures/search-index.js");

/// The shipped sample, parsed and resolved.
#[allow(dead_code)] // Used across different integration test crates
pub fn sample_index() -> SearchIndex {
    SearchIndex::parse_str(SAMPLE).expect("the shipped sample should parse")
}

/// A temporary directory holding artifact files for one test.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct TempArtifacts {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempArtifacts {
    /// Creates a new empty temporary directory.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes an artifact file and returns its full path.
    ///
    /// # Panics
    /// Panics if the write fails.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(name);
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", name, e));
        full_path
    }
}

impl Default for TempArtifacts {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh temp directory for artifact files.
#[fixture]
#[allow(dead_code)] // Used across different integration test crates
pub fn temp_artifacts() -> TempArtifacts {
    TempArtifacts::new()
}
