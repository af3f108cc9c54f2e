use crate::domain::candidate::CandidateRecord;

/// Levenshtein distance over `char`s; insertions, deletions and substitutions cost 1.
pub use strsim::levenshtein;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    pub index: usize,
    pub distance: usize,
}

/// Picks the catalog candidate whose name is closest to the observed product name.
#[derive(Clone, Debug, Default)]
pub struct SimilarityMatcher {
    max_distance: Option<usize>,
}

impl SimilarityMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects matches farther than `max_distance` edits.
    pub fn with_max_distance(max_distance: Option<usize>) -> Self {
        Self { max_distance }
    }

    pub fn max_distance(&self) -> Option<usize> {
        self.max_distance
    }

    /// Minimum-distance candidate, first occurrence winning ties. Names are compared as given,
    /// so an empty name is measured against the empty string rather than skipped.
    pub fn best_match(&self, query: &str, candidates: &[CandidateRecord]) -> Option<MatchOutcome> {
        let mut best: Option<MatchOutcome> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let distance = levenshtein(query, &candidate.name);
            if best.map_or(true, |current| distance < current.distance) {
                best = Some(MatchOutcome { index, distance });
            }
        }

        best.filter(|outcome| self.max_distance.map_or(true, |limit| outcome.distance <= limit))
    }
}
