mod eligibility;
mod error;
mod rationale;
mod recommender;
mod score;

pub use eligibility::{partition, ExclusionReason, Partition};
pub use error::{EngineError, Result};
pub use recommender::{RankedSuggestion, Recommender, RecommenderConfig};
pub use score::{round_score, FreshnessWindow, ScoreBreakdown, ScoreWeights, Scorer};
