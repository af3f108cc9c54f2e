use serde::{Deserialize, Serialize};

use crate::domain::candidate::CandidateRecord;
use crate::domain::score::{ScoreBreakdown, ScoredCandidate};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub current_product: CandidateRecord,
    pub current_score: ScoreBreakdown,
    /// Edit distance between the observed name and `current_product.name`.
    pub match_distance: usize,
    pub best_alternative: Option<CandidateRecord>,
    pub best_alternative_score: Option<ScoreBreakdown>,
    /// Strictly better candidates, best first, truncated to the configured limit.
    pub alternatives: Vec<ScoredCandidate>,
}

impl RecommendationResult {
    pub fn has_better_alternative(&self) -> bool {
        self.best_alternative.is_some()
    }
}
