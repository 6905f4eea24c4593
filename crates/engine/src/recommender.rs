use crate::eligibility::partition;
use crate::error::Result;
use crate::rationale::rationale_for;
use crate::score::{round_score, FreshnessWindow, ScoreBreakdown, ScoreWeights, Scorer};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tandem_catalog::Catalog;
use tandem_protocol::{HistorySnapshot, Suggestion, SuggestionRequest, SuggestionResponse};
use tandem_theme_index::{ThemeExtractor, ThemeMatch};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Ranked suggestions returned per request.
    pub top_n: usize,
    /// Whether a single locked activity may be surfaced as a teaser.
    pub include_teaser: bool,
    /// Time-fit constant applied when no time budget is given.
    pub neutral_time_fit: f32,
    /// Preference scalar for activities with no history.
    pub default_preference: f32,
    pub freshness_floor_hours: f32,
    pub freshness_ceiling_hours: f32,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            include_teaser: true,
            neutral_time_fit: 0.5,
            default_preference: 0.5,
            freshness_floor_hours: 24.0,
            freshness_ceiling_hours: 168.0,
        }
    }
}

/// A suggestion plus the factor breakdown it was ranked with.
#[derive(Debug, Clone)]
pub struct RankedSuggestion {
    pub suggestion: Suggestion,
    pub breakdown: ScoreBreakdown,
}

struct Candidate {
    idx: usize,
    score: f32,
    breakdown: ScoreBreakdown,
    available: bool,
}

/// Composes extraction, filtering, scoring and rationale into one ranked,
/// explainable response. Stateless per call; the catalog is shared
/// read-only, so any number of requests may run concurrently.
pub struct Recommender {
    catalog: Arc<Catalog>,
    extractor: ThemeExtractor,
    weights: ScoreWeights,
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>, extractor: ThemeExtractor) -> Result<Self> {
        Self::with_config(
            catalog,
            extractor,
            ScoreWeights::default(),
            RecommenderConfig::default(),
        )
    }

    pub fn with_config(
        catalog: Arc<Catalog>,
        extractor: ThemeExtractor,
        weights: ScoreWeights,
        config: RecommenderConfig,
    ) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            catalog,
            extractor,
            weights,
            config,
        })
    }

    /// The full recommendation pass. Only boundary validation can fail;
    /// extraction degrades internally and an empty eligible set is a normal
    /// (possibly teaser-only, possibly empty) response.
    pub async fn suggest(
        &self,
        request: &SuggestionRequest,
        history: &HistorySnapshot,
    ) -> Result<SuggestionResponse> {
        let ranked = self.rank(request, history).await?;
        Ok(SuggestionResponse {
            suggestions: ranked.into_iter().map(|r| r.suggestion).collect(),
        })
    }

    /// As `suggest`, but keeps the per-factor breakdowns.
    pub async fn rank(
        &self,
        request: &SuggestionRequest,
        history: &HistorySnapshot,
    ) -> Result<Vec<RankedSuggestion>> {
        request.validate()?;
        history.validate()?;

        let themes = match &request.transcript {
            Some(transcript) => self.extractor.extract(transcript).await,
            None => Vec::new(),
        };
        log::debug!("Extracted {} themes", themes.len());

        let split = partition(&self.catalog, request);
        let (too_long, repeats, contraindicated) = split.reason_counts();
        log::debug!(
            "Partition: {} eligible, {} locked, excluded {} too-long / {} repeats / {} contraindicated",
            split.eligible.len(),
            split.teaser_locked.len(),
            too_long,
            repeats,
            contraindicated
        );

        let input_themes: HashSet<&str> =
            themes.iter().map(|theme| theme.label.as_str()).collect();
        let scorer = Scorer::new(
            self.weights,
            FreshnessWindow {
                floor_hours: self.config.freshness_floor_hours,
                ceiling_hours: self.config.freshness_ceiling_hours,
            },
            self.config.neutral_time_fit,
            self.config.default_preference,
            input_themes,
            request.time_available_minutes,
            request.couple_level,
            history,
        );

        let mut candidates: Vec<Candidate> = split
            .eligible
            .iter()
            .map(|&idx| {
                let breakdown = scorer.score(&self.catalog.activities()[idx], None);
                Candidate {
                    idx,
                    score: round_score(breakdown.total),
                    breakdown,
                    available: true,
                }
            })
            .collect();

        if self.config.include_teaser {
            if let Some(teaser) = self.pick_teaser(&split.teaser_locked, &scorer) {
                candidates.push(teaser);
            }
        }

        // Descending by rounded score; equal scores keep catalog insertion
        // order so repeated calls rank identically.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.idx.cmp(&b.idx))
        });
        candidates.truncate(self.config.top_n);

        let ranked: Vec<RankedSuggestion> = candidates
            .into_iter()
            .map(|candidate| self.into_ranked(candidate, &themes, request))
            .collect();

        log::info!("Returning {} suggestions", ranked.len());
        Ok(ranked)
    }

    /// The single highest-potential locked activity: the one closest to
    /// unlocking, ties broken by catalog order. Scored as if just unlocked
    /// and surfaced as unavailable.
    fn pick_teaser(&self, teaser_locked: &[usize], scorer: &Scorer<'_>) -> Option<Candidate> {
        let idx = teaser_locked
            .iter()
            .copied()
            .min_by_key(|&idx| (self.catalog.activities()[idx].level_required, idx))?;
        let activity = &self.catalog.activities()[idx];
        let breakdown = scorer.score(activity, Some(scorer.just_unlocked_level_fit()));
        log::debug!(
            "Teaser candidate '{}' (unlocks at level {})",
            activity.id,
            activity.level_required
        );
        Some(Candidate {
            idx,
            score: round_score(breakdown.total),
            breakdown,
            available: false,
        })
    }

    fn into_ranked(
        &self,
        candidate: Candidate,
        themes: &[ThemeMatch],
        request: &SuggestionRequest,
    ) -> RankedSuggestion {
        let activity = &self.catalog.activities()[candidate.idx];
        let rationale = rationale_for(activity, themes, request);
        RankedSuggestion {
            suggestion: Suggestion {
                activity_id: activity.id.clone(),
                score: candidate.score,
                rationale,
                level_required: activity.level_required,
                available: candidate.available,
                unlock_at_level: (!candidate.available).then_some(activity.level_required),
            },
            breakdown: candidate.breakdown,
        }
    }
}
