pub mod builder;
pub mod cli;
pub mod emit;
pub mod error;
pub mod index;
pub mod intern;
pub mod item_type;
pub mod parse;
pub mod search;
pub mod summary;
pub mod tracing;
pub mod validate;

pub use builder::IndexBuilder;
pub use index::SearchIndex;
pub use item_type::ItemType;
pub use search::{SearchEngine, SearchResult};
