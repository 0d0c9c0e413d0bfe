//! Native search over a resolved index.
//!
//! The artifact exists to feed a search widget; this module is that widget's
//! query side done in-process: name relevance with kind and path filters,
//! signature search, and a TF-IDF fallback over desc snippets.

mod engine;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

pub use engine::{SearchEngine, SearchResult};
pub use query::{ParsedQuery, QueryTerms, parse_query};
