use crate::embeddings::EmbeddingClient;
use crate::error::ThemeIndexError;
use crate::index::ThemeVectorIndex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tandem_catalog::ThemeDef;

/// One extracted theme with its confidence in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMatch {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Cap on returned themes (k).
    pub max_themes: usize,
    /// Cosine similarity floor for the semantic path (τ).
    pub similarity_threshold: f32,
    /// Inputs shorter than this carry too little signal; return nothing.
    pub min_text_chars: usize,
    /// Bound on the single external embedding call.
    pub timeout_ms: u64,
    /// Fixed confidence assigned by the keyword fallback.
    pub fallback_confidence: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_themes: 5,
            similarity_threshold: 0.7,
            min_text_chars: 10,
            timeout_ms: 2_000,
            fallback_confidence: 0.8,
        }
    }
}

struct SemanticPath {
    client: Arc<dyn EmbeddingClient>,
    index: ThemeVectorIndex,
}

/// Maps free text to ranked theme labels. Semantic retrieval when a client
/// and index are wired in; keyword containment otherwise, and as the
/// degraded path when the service errors or times out. Extraction itself
/// never fails the request.
pub struct ThemeExtractor {
    themes: Vec<ThemeDef>,
    semantic: Option<SemanticPath>,
    config: ExtractorConfig,
}

impl ThemeExtractor {
    /// Extractor without a semantic path; every call uses keyword matching.
    #[must_use]
    pub fn keyword_only(themes: Vec<ThemeDef>, config: ExtractorConfig) -> Self {
        Self {
            themes,
            semantic: None,
            config,
        }
    }

    #[must_use]
    pub fn with_semantic(
        themes: Vec<ThemeDef>,
        client: Arc<dyn EmbeddingClient>,
        index: ThemeVectorIndex,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            themes,
            semantic: Some(SemanticPath { client, index }),
            config,
        }
    }

    /// Ordered (descending confidence), deduplicated theme matches, capped
    /// at `max_themes`. Empty for inputs under `min_text_chars`.
    pub async fn extract(&self, text: &str) -> Vec<ThemeMatch> {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.min_text_chars {
            log::debug!(
                "Transcript under {} chars, skipping extraction",
                self.config.min_text_chars
            );
            return Vec::new();
        }

        if let Some(semantic) = &self.semantic {
            match self.extract_semantic(semantic, trimmed).await {
                Ok(matches) => {
                    log::debug!("Semantic extraction: {} themes", matches.len());
                    return matches;
                }
                Err(reason) => {
                    log::warn!("Semantic extraction degraded to keywords: {reason}");
                }
            }
        }

        self.extract_keywords(trimmed)
    }

    async fn extract_semantic(
        &self,
        semantic: &SemanticPath,
        text: &str,
    ) -> crate::error::Result<Vec<ThemeMatch>> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let embedding = tokio::time::timeout(timeout, semantic.client.embed(text))
            .await
            .map_err(|_| ThemeIndexError::ServiceTimeout(self.config.timeout_ms))??;

        let neighbors = semantic.index.search(
            &embedding,
            self.config.max_themes,
            self.config.similarity_threshold,
        )?;

        Ok(neighbors
            .into_iter()
            .map(|(label, similarity)| ThemeMatch {
                label,
                confidence: similarity.clamp(0.0, 1.0),
            })
            .collect())
    }

    /// Case-insensitive keyword containment. No similarity ranking here;
    /// order is catalog theme order and every match gets the same fixed
    /// confidence.
    fn extract_keywords(&self, text: &str) -> Vec<ThemeMatch> {
        let matches: Vec<ThemeMatch> = self
            .themes
            .iter()
            .filter(|theme| theme.matches_keywords(text))
            .take(self.config.max_themes)
            .map(|theme| ThemeMatch {
                label: theme.label.clone(),
                confidence: self.config.fallback_confidence,
            })
            .collect();
        log::debug!("Keyword extraction: {} themes", matches.len());
        matches
    }

    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::StubEmbeddingClient;
    use pretty_assertions::assert_eq;

    fn themes() -> Vec<ThemeDef> {
        vec![
            ThemeDef {
                label: "resentment".to_string(),
                description: "unspoken grievances and score-keeping".to_string(),
                keywords: vec!["never".to_string(), "always".to_string()],
            },
            ThemeDef {
                label: "household_labor".to_string(),
                description: "chores and the mental load of the home".to_string(),
                keywords: vec!["dishes".to_string(), "help".to_string()],
            },
            ThemeDef {
                label: "intimacy".to_string(),
                description: "closeness and affection".to_string(),
                keywords: vec!["roommates".to_string(), "miss us".to_string()],
            },
        ]
    }

    fn labels(matches: &[ThemeMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.label.as_str()).collect()
    }

    #[tokio::test]
    async fn short_text_yields_no_themes() {
        let extractor = ThemeExtractor::keyword_only(themes(), ExtractorConfig::default());
        assert!(extractor.extract("help").await.is_empty());
        assert!(extractor.extract("   ").await.is_empty());
    }

    #[tokio::test]
    async fn keyword_path_uses_catalog_order_and_fixed_confidence() {
        let extractor = ThemeExtractor::keyword_only(themes(), ExtractorConfig::default());
        let matches = extractor
            .extract("You never help with the dishes")
            .await;
        assert_eq!(labels(&matches), vec!["resentment", "household_labor"]);
        for m in &matches {
            assert!((m.confidence - 0.8).abs() < f32::EPSILON);
        }
    }

    #[tokio::test]
    async fn keyword_path_caps_at_max_themes() {
        let config = ExtractorConfig {
            max_themes: 1,
            ..ExtractorConfig::default()
        };
        let extractor = ThemeExtractor::keyword_only(themes(), config);
        let matches = extractor
            .extract("You never help with the dishes")
            .await;
        assert_eq!(labels(&matches), vec!["resentment"]);
    }

    #[tokio::test]
    async fn semantic_path_returns_nearest_theme() {
        let theme_defs = themes();
        let client = StubEmbeddingClient::new(24);
        let index = ThemeVectorIndex::build(&client, &theme_defs)
            .await
            .unwrap();
        let extractor = ThemeExtractor::with_semantic(
            theme_defs,
            Arc::new(client.clone()),
            index,
            ExtractorConfig::default(),
        );

        // The description itself embeds identically, so its theme clears the
        // similarity threshold with confidence ~1.0 and ranks first.
        let matches = extractor.extract("closeness and affection").await;
        assert_eq!(matches[0].label, "intimacy");
        assert!(matches[0].confidence > 0.99);
    }

    struct SlowClient;

    #[async_trait::async_trait]
    impl EmbeddingClient for SlowClient {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![0.0; 8])
        }
    }

    #[tokio::test]
    async fn service_timeout_degrades_to_keywords() {
        let config = ExtractorConfig {
            timeout_ms: 20,
            ..ExtractorConfig::default()
        };
        let extractor = ThemeExtractor::with_semantic(
            themes(),
            Arc::new(SlowClient),
            ThemeVectorIndex::new(8),
            config,
        );

        let matches = extractor.extract("we feel like roommates").await;
        assert_eq!(labels(&matches), vec!["intimacy"]);
    }

    #[tokio::test]
    async fn service_failure_degrades_to_keywords() {
        let theme_defs = themes();
        let index = ThemeVectorIndex::new(8);
        let extractor = ThemeExtractor::with_semantic(
            theme_defs,
            Arc::new(StubEmbeddingClient::failing()),
            index,
            ExtractorConfig::default(),
        );

        let matches = extractor.extract("we feel like roommates").await;
        assert_eq!(labels(&matches), vec!["intimacy"]);
        assert!((matches[0].confidence - 0.8).abs() < f32::EPSILON);
    }
}
