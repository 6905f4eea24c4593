use crate::error::{Result, ThemeIndexError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seam to the external embedding/retrieval service. One call per request;
/// the extractor owns the timeout and the fallback.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

pub(crate) fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

#[derive(Serialize)]
struct EmbedRequestBody<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponseBody {
    embedding: Vec<f32>,
}

/// HTTP client for the embedding service (`POST {endpoint}` with
/// `{"input": text}`, responding `{"embedding": [f32, ...]}`).
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEmbeddingClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequestBody { input: text })
            .send()
            .await?
            .error_for_status()?;

        let body: EmbedResponseBody = response.json().await?;
        if body.embedding.is_empty() {
            return Err(ThemeIndexError::EmbeddingError(
                "Embedding service returned an empty vector".to_string(),
            ));
        }
        Ok(body.embedding)
    }
}

/// Deterministic hash-seeded unit vectors, for tests and offline development.
/// Identical text always embeds to the identical vector.
#[derive(Clone)]
pub struct StubEmbeddingClient {
    dimension: usize,
    fail: bool,
}

impl StubEmbeddingClient {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
        }
    }

    /// A stub that always errors, to exercise the degraded path.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            dimension: 0,
            fail: true,
        }
    }

    #[must_use]
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        stub_embed(text, self.dimension)
    }
}

#[async_trait]
impl EmbeddingClient for StubEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(ThemeIndexError::EmbeddingError(
                "stub client configured to fail".to_string(),
            ));
        }
        Ok(stub_embed(text, self.dimension))
    }
}

fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
