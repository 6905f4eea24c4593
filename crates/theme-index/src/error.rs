use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThemeIndexError>;

#[derive(Error, Debug)]
pub enum ThemeIndexError {
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Embedding service request failed: {0}")]
    ServiceError(#[from] reqwest::Error),

    #[error("Embedding service timed out after {0}ms")]
    ServiceTimeout(u64),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid precomputed vectors document: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Unsupported vectors schema_version {0} (expected 1)")]
    UnsupportedSchemaVersion(u32),
}
