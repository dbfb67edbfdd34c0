//! imagedb-text
//!
//! Tantivy-backed storage for image records and keyword search over their
//! metadata. See `index` and `search`.

pub mod index;
pub mod search;
pub mod tantivy_utils;
pub mod tokenizer;

pub use imagedb_core::traits::ImageSearcher;
pub use index::ImageIndex;
pub use search::KeywordSearcher;
