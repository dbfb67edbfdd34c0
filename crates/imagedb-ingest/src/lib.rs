//! imagedb-ingest
//!
//! Decodes raw image bytes, hands the bitmap to a feature-family record
//! builder and attaches display metadata to the result.

pub mod builder;
pub mod features;

pub use builder::DocumentBuilder;
pub use features::FeatureFamily;
