use serde::{Deserialize, Serialize};
use tandem_protocol::EmotionalState;

/// Inclusive duration window for an activity, in minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
}

impl DurationRange {
    /// Midpoint used by time-fit scoring.
    #[must_use]
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) as f32 / 2.0
    }

    /// Can the activity at least be started within the given budget?
    #[must_use]
    pub const fn fits_within(&self, available_minutes: u32) -> bool {
        self.min <= available_minutes
    }
}

/// One relational exercise as defined by the catalog. Immutable at runtime;
/// requests never add, remove, or change activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    /// Generic one-sentence copy; doubles as the rationale fallback.
    pub description: String,
    pub themes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub duration_minutes: DurationRange,
    pub level_required: u32,
    #[serde(default)]
    pub contraindications: Vec<EmotionalState>,
    #[serde(default)]
    pub debrief_questions: Vec<String>,
}

impl Activity {
    #[must_use]
    pub fn addresses_theme(&self, label: &str) -> bool {
        self.themes.iter().any(|theme| theme == label)
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn contraindicated_for(&self, state: EmotionalState) -> bool {
        self.contraindications.contains(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_of_range() {
        let range = DurationRange { min: 20, max: 30 };
        assert!((range.midpoint() - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_budget_fits_nothing() {
        let range = DurationRange { min: 1, max: 5 };
        assert!(!range.fits_within(0));
        assert!(range.fits_within(1));
    }
}
