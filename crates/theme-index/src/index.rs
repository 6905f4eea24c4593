use crate::embeddings::{cosine_similarity, EmbeddingClient};
use crate::error::{Result, ThemeIndexError};
use serde::Deserialize;
use tandem_catalog::ThemeDef;

const VECTORS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct VectorsDocument {
    schema_version: u32,
    vectors: Vec<PrecomputedVector>,
}

#[derive(Debug, Deserialize)]
struct PrecomputedVector {
    label: String,
    vector: Vec<f32>,
}

/// Nearest-neighbor index over the precomputed theme vectors. Brute-force
/// cosine; the catalog carries tens of themes, not millions.
pub struct ThemeVectorIndex {
    dimension: usize,
    labels: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl ThemeVectorIndex {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            labels: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Add a theme vector. Labels follow catalog theme order.
    pub fn add(&mut self, label: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(ThemeIndexError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.labels.push(label.into());
        self.vectors.push(vector);
        Ok(())
    }

    /// Load an index from a precomputed vectors document (JSON).
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: VectorsDocument = serde_json::from_str(raw)?;
        if document.schema_version != VECTORS_SCHEMA_VERSION {
            return Err(ThemeIndexError::UnsupportedSchemaVersion(
                document.schema_version,
            ));
        }

        let dimension = document
            .vectors
            .first()
            .map(|entry| entry.vector.len())
            .unwrap_or(0);
        let mut index = Self::new(dimension);
        for entry in document.vectors {
            index.add(entry.label, entry.vector)?;
        }
        Ok(index)
    }

    /// Build the index at boot by embedding each theme's description through
    /// the client. Used when no precomputed asset is available.
    pub async fn build(client: &dyn EmbeddingClient, themes: &[ThemeDef]) -> Result<Self> {
        let mut index: Option<Self> = None;
        for theme in themes {
            let vector = client.embed(&theme.description).await?;
            let target = index.get_or_insert_with(|| Self::new(vector.len()));
            target.add(theme.label.clone(), vector)?;
        }
        let index = index.unwrap_or_else(|| Self::new(0));
        log::info!("Theme index built: {} themes", index.len());
        Ok(index)
    }

    /// Neighbors with cosine similarity >= `threshold`, sorted descending,
    /// capped at `k`. Ties keep catalog theme order (stable sort).
    pub fn search(&self, query: &[f32], k: usize, threshold: f32) -> Result<Vec<(String, f32)>> {
        if query.len() != self.dimension {
            return Err(ThemeIndexError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, cosine_similarity(query, vector)))
            .filter(|(_, similarity)| *similarity >= threshold)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, similarity)| (self.labels[idx].clone(), similarity))
            .collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}
