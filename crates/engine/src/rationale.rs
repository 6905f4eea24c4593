use tandem_catalog::Activity;
use tandem_protocol::{EmotionalState, SuggestionRequest};
use tandem_theme_index::ThemeMatch;

/// Longest duration that still counts as a "short reset" for the elevated
/// state rule.
const SHORT_RESET_MAX_MINUTES: u32 = 10;

/// One short justification per suggestion. Rules are evaluated in order and
/// the first match wins; the activity's generic description is the terminal
/// fallback. The caller's raw transcript is never quoted here, so nothing
/// sensitive can leak into UI copy or logs.
pub(crate) fn rationale_for(
    activity: &Activity,
    matched_themes: &[ThemeMatch],
    request: &SuggestionRequest,
) -> String {
    // Matched themes arrive ordered by confidence; the first one this
    // activity addresses wins.
    for theme in matched_themes {
        if activity.addresses_theme(&theme.label) {
            if let Some(copy) = theme_copy(&theme.label) {
                return copy.to_string();
            }
        }
    }

    if request.emotional_state == Some(EmotionalState::Elevated)
        && activity.duration_minutes.max <= SHORT_RESET_MAX_MINUTES
        && (activity.has_tag("calming") || activity.addresses_theme("de_escalation"))
    {
        return "A short reset to bring the temperature down before you talk further."
            .to_string();
    }

    if let Some(available) = request.time_available_minutes {
        if activity.duration_minutes.max <= available {
            return format!(
                "Fits comfortably in the {available} minutes you have right now."
            );
        }
    }

    activity.description.clone()
}

fn theme_copy(label: &str) -> Option<&'static str> {
    let copy = match label {
        "resentment" => "Helps air the quiet score-keeping before it hardens.",
        "household_labor" => "Puts the invisible work at home on the table, together.",
        "de_escalation" => "Built to lower the temperature before any problem-solving.",
        "appreciation" => "A chance to say the thank-yous that usually go unsaid.",
        "communication" => "Practice being heard without rushing to fix anything.",
        "intimacy" => "Rebuilds the partner-feeling when life has made you roommates.",
        "quality_time" => "Protects a pocket of real time for just the two of you.",
        "trust" => "Small honest reps that make relying on each other easier.",
        "conflict_repair" => "Gives you both a way back in after a blow-up.",
        "future_planning" => "Points the two of you at the same horizon.",
        _ => return None,
    };
    Some(copy)
}
