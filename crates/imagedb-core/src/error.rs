use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Query '{query}' rejected: {reason}")]
    QueryParse { query: String, reason: String },

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index operation failed: {0}")]
    Index(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps an index-engine failure, keeping only its message.
    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        Error::Index(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
