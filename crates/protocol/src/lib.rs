use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// How many leading entries of `recent_games` block re-suggestion.
pub const ANTI_REPEAT_WINDOW: usize = 3;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, PartialEq)]
pub enum ProtocolError {
    #[error("couple_level is required and must be >= 1 (got {0})")]
    InvalidCoupleLevel(u32),

    #[error("transcript exceeds {max} characters ({actual})")]
    TranscriptTooLong { max: usize, actual: usize },

    #[error("preference value for '{activity_id}' must be in [0,1] (got {value})")]
    PreferenceOutOfRange { activity_id: String, value: f32 },
}

/// Emotional states a caller may report for the current conversation.
///
/// Activities list the states they are contraindicated for; the filter only
/// applies the rule when a state is actually supplied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Calm,
    Frustrated,
    Sad,
    Angry,
    Elevated,
}

/// A single recommendation request, as received from a mediator or games
/// caller. Everything except `couple_level` is optional.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionRequest {
    /// Raw conversational text. Only ever read by theme extraction; the
    /// response never echoes it back.
    #[serde(default)]
    pub transcript: Option<String>,

    /// Minutes the couple has right now. `Some(0)` is honored as given:
    /// no activity fits in zero minutes, so nothing is time-eligible.
    #[serde(default)]
    pub time_available_minutes: Option<u32>,

    #[serde(default)]
    pub emotional_state: Option<EmotionalState>,

    /// Activity ids, most-recent-first, within the caller's 7-day window.
    /// Ids no longer in the catalog are ignored.
    #[serde(default)]
    pub recent_games: Vec<String>,

    /// Current level of the couple. Required, >= 1.
    pub couple_level: u32,

    /// Opaque handle the caller's storage layer uses to fetch the
    /// preference ratios delivered in the history snapshot.
    #[serde(default)]
    pub preference_key: Option<String>,
}

const MAX_TRANSCRIPT_CHARS: usize = 16_000;

impl SuggestionRequest {
    /// Minimal request with only the required field set.
    #[must_use]
    pub fn for_level(couple_level: u32) -> Self {
        Self {
            transcript: None,
            time_available_minutes: None,
            emotional_state: None,
            recent_games: Vec::new(),
            couple_level,
            preference_key: None,
        }
    }

    /// Boundary validation. Rejects malformed input before anything is
    /// scored; all optional fields have documented defaults downstream.
    pub fn validate(&self) -> Result<()> {
        if self.couple_level == 0 {
            return Err(ProtocolError::InvalidCoupleLevel(self.couple_level));
        }
        if let Some(transcript) = &self.transcript {
            let actual = transcript.chars().count();
            if actual > MAX_TRANSCRIPT_CHARS {
                return Err(ProtocolError::TranscriptTooLong {
                    max: MAX_TRANSCRIPT_CHARS,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// The ids whose re-suggestion is blocked by the anti-repetition window.
    pub fn blocked_recent(&self) -> impl Iterator<Item = &str> {
        self.recent_games
            .iter()
            .take(ANTI_REPEAT_WINDOW)
            .map(String::as_str)
    }
}

/// Read-only per-request inputs fetched by the caller's history store:
/// recency per activity and the precomputed preference scalar per activity.
///
/// Hours are supplied by the caller rather than timestamps so scoring never
/// reads the wall clock and repeated calls stay deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistorySnapshot {
    /// Hours since each activity was last played. Absent = never played.
    #[serde(default)]
    pub hours_since_played: HashMap<String, f32>,

    /// Precomputed per-activity preference ratio in [0,1]. Absent = 0.5.
    #[serde(default)]
    pub preference: HashMap<String, f32>,
}

impl HistorySnapshot {
    pub fn validate(&self) -> Result<()> {
        for (activity_id, value) in &self.preference {
            if !(0.0..=1.0).contains(value) {
                return Err(ProtocolError::PreferenceOutOfRange {
                    activity_id: activity_id.clone(),
                    value: *value,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn hours_since(&self, activity_id: &str) -> Option<f32> {
        self.hours_since_played.get(activity_id).copied()
    }

    #[must_use]
    pub fn preference_for(&self, activity_id: &str, default: f32) -> f32 {
        self.preference
            .get(activity_id)
            .copied()
            .unwrap_or(default)
    }
}

/// One ranked suggestion in the response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    pub activity_id: String,
    /// Final weighted score in [0,1], rounded to 2 decimals.
    pub score: f32,
    pub rationale: String,
    pub level_required: u32,
    /// False only for the single teaser slot.
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_at_level: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
}

impl SuggestionResponse {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_with_zero_level_is_rejected() {
        let request = SuggestionRequest::for_level(0);
        assert_eq!(
            request.validate(),
            Err(ProtocolError::InvalidCoupleLevel(0))
        );
    }

    #[test]
    fn minimal_request_deserializes_with_defaults() {
        let request: SuggestionRequest =
            serde_json::from_str(r#"{"couple_level": 2}"#).expect("parse");
        assert_eq!(request.couple_level, 2);
        assert_eq!(request.transcript, None);
        assert_eq!(request.time_available_minutes, None);
        assert!(request.recent_games.is_empty());
        request.validate().expect("valid");
    }

    #[test]
    fn missing_couple_level_fails_to_parse() {
        let parsed: std::result::Result<SuggestionRequest, _> =
            serde_json::from_str(r#"{"transcript": "hello"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn emotional_state_uses_snake_case() {
        let state: EmotionalState = serde_json::from_str(r#""elevated""#).expect("parse");
        assert_eq!(state, EmotionalState::Elevated);
    }

    #[test]
    fn blocked_recent_caps_at_window() {
        let mut request = SuggestionRequest::for_level(1);
        request.recent_games = vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ];
        let blocked: Vec<&str> = request.blocked_recent().collect();
        assert_eq!(blocked, vec!["a", "b", "c"]);
    }

    #[test]
    fn history_rejects_out_of_range_preference() {
        let mut history = HistorySnapshot::default();
        history.preference.insert("x".to_string(), 1.5);
        assert!(history.validate().is_err());
    }

    #[test]
    fn history_defaults_apply() {
        let history = HistorySnapshot::default();
        assert_eq!(history.hours_since("never-played"), None);
        assert_eq!(history.preference_for("never-rated", 0.5), 0.5);
    }

    #[test]
    fn unlock_level_is_omitted_when_absent() {
        let suggestion = Suggestion {
            activity_id: "a1".to_string(),
            score: 0.87,
            rationale: "why".to_string(),
            level_required: 1,
            available: true,
            unlock_at_level: None,
        };
        let raw = serde_json::to_string(&suggestion).expect("serialize");
        assert!(!raw.contains("unlock_at_level"));
    }
}
