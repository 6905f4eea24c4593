mod embeddings;
mod error;
mod extractor;
mod index;

pub use embeddings::{
    cosine_similarity, EmbeddingClient, HttpEmbeddingClient, StubEmbeddingClient,
};
pub use error::{Result, ThemeIndexError};
pub use extractor::{ExtractorConfig, ThemeExtractor, ThemeMatch};
pub use index::ThemeVectorIndex;
