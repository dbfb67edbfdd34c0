#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod distance;
pub mod error;
pub mod fields;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use fields::MetadataField;
pub use types::{DisplayMetadata, ImageDuplicates, Record, SearchHits, SearchQuery, SearchResult};
