use crate::domain::candidate::CandidateRecord;
use crate::domain::score::{ScoreBreakdown, ScoredCandidate};
use crate::engine::scoring::ScoreCalculator;

/// Orders catalog candidates that strictly beat the current product's score.
#[derive(Debug, Clone, Default)]
pub struct AlternativeRanker {
    calculator: ScoreCalculator,
}

impl AlternativeRanker {
    pub fn new(calculator: ScoreCalculator) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Candidates with `total > current.total`, best first. Equal totals keep input order.
    pub fn rank(
        &self,
        current: &ScoreBreakdown,
        candidates: &[CandidateRecord],
    ) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                candidate: candidate.clone(),
                score: self.calculator.score(candidate),
            })
            .filter(|scored| scored.score.total > current.total)
            .collect();

        // `sort_by` is stable, which keeps ties in catalog order.
        ranked.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
        ranked
    }
}
