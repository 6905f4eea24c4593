use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use tandem_catalog::{Activity, DurationRange};
use tandem_protocol::HistorySnapshot;

/// Relative weight of each scoring factor. Must sum to 1.0; every factor is
/// clamped to [0,1] before weighting, so the combined score stays in [0,1].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub theme_match: f32,
    pub time_fit: f32,
    pub level_fit: f32,
    pub freshness: f32,
    pub preference: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            theme_match: 0.45,
            time_fit: 0.20,
            level_fit: 0.20,
            freshness: 0.10,
            preference: 0.05,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<()> {
        let sum = self.theme_match + self.time_fit + self.level_fit + self.freshness
            + self.preference;
        if (sum - 1.0).abs() > 1e-4 {
            return Err(EngineError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Freshness ramp: 0 below the floor, 1 at the ceiling, linear between.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessWindow {
    pub floor_hours: f32,
    pub ceiling_hours: f32,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            floor_hours: 24.0,
            ceiling_hours: 168.0,
        }
    }
}

/// Per-factor sub-scores (already clamped) plus the weighted total, kept for
/// explainability and diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ScoreBreakdown {
    pub theme_match: f32,
    pub time_fit: f32,
    pub level_fit: f32,
    pub freshness: f32,
    pub preference: f32,
    pub total: f32,
}

/// Scores candidates for a single request. Cheap to build; holds only
/// borrowed request-scoped inputs.
pub struct Scorer<'a> {
    weights: ScoreWeights,
    window: FreshnessWindow,
    neutral_time_fit: f32,
    default_preference: f32,
    input_themes: HashSet<&'a str>,
    time_available: Option<u32>,
    couple_level: u32,
    history: &'a HistorySnapshot,
}

impl<'a> Scorer<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        weights: ScoreWeights,
        window: FreshnessWindow,
        neutral_time_fit: f32,
        default_preference: f32,
        input_themes: HashSet<&'a str>,
        time_available: Option<u32>,
        couple_level: u32,
        history: &'a HistorySnapshot,
    ) -> Self {
        Self {
            weights,
            window,
            neutral_time_fit,
            default_preference,
            input_themes,
            time_available,
            couple_level,
            history,
        }
    }

    /// Weighted score for one candidate. `level_fit_override` is used for
    /// the teaser slot, where the activity is scored as if just unlocked.
    pub fn score(&self, activity: &Activity, level_fit_override: Option<f32>) -> ScoreBreakdown {
        let theme_match = theme_match_factor(&self.input_themes, &activity.themes);
        let time_fit = time_fit_factor(
            self.time_available,
            activity.duration_minutes,
            self.neutral_time_fit,
        );
        let level_fit = level_fit_override.unwrap_or_else(|| {
            level_fit_factor(self.couple_level, activity.level_required)
        });
        let freshness = freshness_factor(self.history.hours_since(&activity.id), self.window);
        let preference = self
            .history
            .preference_for(&activity.id, self.default_preference)
            .clamp(0.0, 1.0);

        let level_fit = level_fit.clamp(0.0, 1.0);
        let total = self.weights.theme_match * theme_match
            + self.weights.time_fit * time_fit
            + self.weights.level_fit * level_fit
            + self.weights.freshness * freshness
            + self.weights.preference * preference;

        ScoreBreakdown {
            theme_match,
            time_fit,
            level_fit,
            freshness,
            preference,
            total: total.clamp(0.0, 1.0),
        }
    }

    /// Level fit of an activity the couple just unlocked; the teaser slot is
    /// scored with this value in place of its real (negative) fit.
    #[must_use]
    pub fn just_unlocked_level_fit(&self) -> f32 {
        level_fit_factor(self.couple_level, self.couple_level)
    }
}

/// Jaccard-style overlap against the larger of the two theme sets. Zero
/// when no input themes were extracted.
pub(crate) fn theme_match_factor(input: &HashSet<&str>, activity_themes: &[String]) -> f32 {
    if input.is_empty() {
        return 0.0;
    }
    let overlap = activity_themes
        .iter()
        .filter(|theme| input.contains(theme.as_str()))
        .count();
    let denom = input.len().max(activity_themes.len()).max(1);
    (overlap as f32 / denom as f32).clamp(0.0, 1.0)
}

/// Distance of the time budget from the activity's duration midpoint,
/// normalized by the midpoint. Neutral constant when no budget was given.
pub(crate) fn time_fit_factor(
    available: Option<u32>,
    range: DurationRange,
    neutral: f32,
) -> f32 {
    let Some(available) = available else {
        return neutral.clamp(0.0, 1.0);
    };
    let midpoint = range.midpoint();
    if midpoint <= 0.0 {
        return 0.0;
    }
    let distance = ((available as f32 - midpoint).abs() / midpoint).clamp(0.0, 1.0);
    1.0 - distance
}

/// How comfortably the couple clears the level gate; 1.0 the moment an
/// activity unlocks, shrinking as the gate falls further below their level.
pub(crate) fn level_fit_factor(couple_level: u32, level_required: u32) -> f32 {
    let headroom = couple_level as f32 - level_required as f32 + 1.0;
    (headroom / couple_level as f32).clamp(0.0, 1.0)
}

/// 0 within the floor (played too recently), 1 at the ceiling or if never
/// played, linear in between.
pub(crate) fn freshness_factor(hours_since_played: Option<f32>, window: FreshnessWindow) -> f32 {
    let Some(hours) = hours_since_played else {
        return 1.0;
    };
    if hours < window.floor_hours {
        return 0.0;
    }
    if hours >= window.ceiling_hours {
        return 1.0;
    }
    let span = (window.ceiling_hours - window.floor_hours).max(1e-3);
    ((hours - window.floor_hours) / span).clamp(0.0, 1.0)
}

/// Scores are reported to callers rounded to 2 decimals; ranking uses the
/// same rounded value so displayed order can never disagree with sort order.
#[must_use]
pub fn round_score(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}
