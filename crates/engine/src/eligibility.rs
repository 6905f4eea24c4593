use std::collections::HashSet;
use tandem_catalog::Catalog;
use tandem_protocol::SuggestionRequest;

/// Why an activity was excluded outright. Diagnostics only; excluded ids
/// never surface, locked or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// `duration.min` does not fit the stated time budget.
    TooLong,
    /// Within the anti-repetition window of `recent_games`.
    RecentlyPlayed,
    /// The reported emotional state is in the contraindication set.
    Contraindicated,
}

/// Disjoint split of the catalog for one request. All three carry catalog
/// insertion indices.
#[derive(Debug, Default)]
pub struct Partition {
    pub eligible: Vec<usize>,
    pub teaser_locked: Vec<usize>,
    pub excluded: Vec<(usize, ExclusionReason)>,
}

impl Partition {
    pub(crate) fn reason_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for (_, reason) in &self.excluded {
            match reason {
                ExclusionReason::TooLong => counts.0 += 1,
                ExclusionReason::RecentlyPlayed => counts.1 += 1,
                ExclusionReason::Contraindicated => counts.2 += 1,
            }
        }
        counts
    }
}

/// Hard pass/fail gate ahead of any scoring.
///
/// Eligible requires every rule to hold; an activity failing only the level
/// gate is teaser-locked; failing any other rule excludes it outright.
/// Unknown ids in `recent_games` simply match nothing in the catalog.
pub fn partition(catalog: &Catalog, request: &SuggestionRequest) -> Partition {
    let blocked: HashSet<&str> = request.blocked_recent().collect();
    let mut partition = Partition::default();

    for (idx, activity) in catalog.activities().iter().enumerate() {
        if blocked.contains(activity.id.as_str()) {
            partition
                .excluded
                .push((idx, ExclusionReason::RecentlyPlayed));
            continue;
        }

        if let Some(available) = request.time_available_minutes {
            if !activity.duration_minutes.fits_within(available) {
                partition.excluded.push((idx, ExclusionReason::TooLong));
                continue;
            }
        }

        if let Some(state) = request.emotional_state {
            if activity.contraindicated_for(state) {
                partition
                    .excluded
                    .push((idx, ExclusionReason::Contraindicated));
                continue;
            }
        }

        if activity.level_required > request.couple_level {
            partition.teaser_locked.push(idx);
        } else {
            partition.eligible.push(idx);
        }
    }

    partition
}
