//! Composite sustainability score for catalog candidates.

use serde::{Deserialize, Serialize};

use crate::domain::candidate::{CandidateRecord, Grade, ProcessingLevel};
use crate::domain::score::{ScoreBreakdown, ScoreComponent};

/// Fixed weights for the score components. They sum to 1.0 and are never renormalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub nutrition: f64,
    pub processing: f64,
    pub eco: f64,
}

pub const SCORING_WEIGHTS: ScoringWeights =
    ScoringWeights { nutrition: 0.5, processing: 0.3, eco: 0.2 };

/// Processing level assumed when the catalog has none (ultra-processed).
pub const DEFAULT_PROCESSING_LEVEL: u8 = ProcessingLevel::MAX;

/// How the NOVA processing level feeds the processing component.
///
/// `AsReported` adds the level directly, so a more processed product scores higher, unlike
/// the nutrition and eco components where higher means healthier. `Inverted` maps level 1 to 4
/// and level 4 to 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPolarity {
    #[default]
    AsReported,
    Inverted,
}

impl std::str::FromStr for ProcessingPolarity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "as_reported" => Ok(Self::AsReported),
            "inverted" => Ok(Self::Inverted),
            other => Err(format!(
                "unsupported processing polarity `{other}` (expected as_reported|inverted)"
            )),
        }
    }
}

/// Pure, total mapping from a candidate's grades to a [`ScoreBreakdown`].
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    polarity: ProcessingPolarity,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polarity(polarity: ProcessingPolarity) -> Self {
        Self { polarity }
    }

    pub fn polarity(&self) -> ProcessingPolarity {
        self.polarity
    }

    pub fn score(&self, candidate: &CandidateRecord) -> ScoreBreakdown {
        let nutrition_component = candidate.nutrition_grade.value();
        let processing_component = self.processing_component(candidate.processing_level);
        let eco_component = candidate.eco_grade.value();

        let total = SCORING_WEIGHTS.nutrition * nutrition_component
            + SCORING_WEIGHTS.processing * processing_component
            + SCORING_WEIGHTS.eco * eco_component;

        let defaulted_components = [
            (candidate.nutrition_grade == Grade::Unknown, ScoreComponent::Nutrition),
            (candidate.processing_level.is_none(), ScoreComponent::Processing),
            (candidate.eco_grade == Grade::Unknown, ScoreComponent::Eco),
        ]
        .into_iter()
        .filter_map(|(defaulted, component)| defaulted.then_some(component))
        .collect();

        ScoreBreakdown {
            nutrition_component,
            processing_component,
            eco_component,
            total,
            defaulted_components,
        }
    }

    fn processing_component(&self, level: Option<ProcessingLevel>) -> f64 {
        let level = level.map(ProcessingLevel::get).unwrap_or(DEFAULT_PROCESSING_LEVEL);
        match self.polarity {
            ProcessingPolarity::AsReported => f64::from(level),
            ProcessingPolarity::Inverted => f64::from(ProcessingLevel::MAX + 1 - level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::Grade;

    fn candidate(nutrition: Grade, level: Option<u8>, eco: Grade) -> CandidateRecord {
        CandidateRecord::new("x", nutrition, level.and_then(ProcessingLevel::new), eco)
    }

    #[test]
    fn weights_sum_to_one() {
        let sum = SCORING_WEIGHTS.nutrition + SCORING_WEIGHTS.processing + SCORING_WEIGHTS.eco;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn composes_weighted_total() {
        let breakdown = ScoreCalculator::new().score(&candidate(Grade::D, Some(4), Grade::C));

        assert_eq!(breakdown.nutrition_component, 2.0);
        assert_eq!(breakdown.processing_component, 4.0);
        assert_eq!(breakdown.eco_component, 3.0);
        // 0.5 * 2 + 0.3 * 4 + 0.2 * 3 = 2.8
        assert!((breakdown.total - 2.8).abs() < 1e-9);
    }

    #[test]
    fn missing_processing_level_defaults_to_worst_case() {
        let breakdown = ScoreCalculator::new().score(&candidate(Grade::A, None, Grade::A));

        assert_eq!(breakdown.processing_component, 4.0);
        assert!((breakdown.total - (2.5 + 1.2 + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn unknown_grades_score_as_worst() {
        let breakdown =
            ScoreCalculator::new().score(&candidate(Grade::Unknown, Some(1), Grade::Unknown));

        assert_eq!(breakdown.nutrition_component, 1.0);
        assert_eq!(breakdown.eco_component, 1.0);
        assert!((breakdown.total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scoring_is_deterministic() {
        let calculator = ScoreCalculator::new();
        let input = candidate(Grade::B, Some(2), Grade::A);

        let first = calculator.score(&input);
        let second = calculator.score(&input);

        assert_eq!(first.total.to_bits(), second.total.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_polarity_rewards_less_processing() {
        let calculator = ScoreCalculator::with_polarity(ProcessingPolarity::Inverted);

        let unprocessed = calculator.score(&candidate(Grade::C, Some(1), Grade::C));
        let ultra = calculator.score(&candidate(Grade::C, Some(4), Grade::C));
        let unknown = calculator.score(&candidate(Grade::C, None, Grade::C));

        assert_eq!(unprocessed.processing_component, 4.0);
        assert_eq!(ultra.processing_component, 1.0);
        assert_eq!(unknown.processing_component, 1.0);
        assert!(unprocessed.total > ultra.total);
    }

    #[test]
    fn reports_components_scored_from_missing_data() {
        let calculator = ScoreCalculator::new();

        let sparse = calculator.score(&candidate(Grade::Unknown, None, Grade::B));
        assert_eq!(
            sparse.defaulted_components,
            vec![ScoreComponent::Nutrition, ScoreComponent::Processing]
        );
        assert!(!sparse.is_complete());

        let bare = calculator.score(&candidate(Grade::Unknown, None, Grade::Unknown));
        assert_eq!(bare.defaulted_components.len(), 3);

        let full = calculator.score(&candidate(Grade::A, Some(1), Grade::A));
        assert!(full.is_complete());
    }

    #[test]
    fn polarity_parses_from_config_strings() {
        assert_eq!("as_reported".parse::<ProcessingPolarity>(), Ok(ProcessingPolarity::AsReported));
        assert_eq!(" Inverted ".parse::<ProcessingPolarity>(), Ok(ProcessingPolarity::Inverted));
        assert!("upside_down".parse::<ProcessingPolarity>().is_err());
    }
}
