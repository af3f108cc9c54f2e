use serde::{Deserialize, Serialize};

use crate::domain::candidate::CandidateRecord;

/// Score inputs that can be absent from a catalog record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreComponent {
    Nutrition,
    Processing,
    Eco,
}

/// Per-attribute components of a composite score and their weighted total.
///
/// `defaulted_components` lists the inputs the catalog did not report, which were scored at
/// their worst-case value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub nutrition_component: f64,
    pub processing_component: f64,
    pub eco_component: f64,
    pub total: f64,
    #[serde(default)]
    pub defaulted_components: Vec<ScoreComponent>,
}

impl ScoreBreakdown {
    pub fn is_complete(&self) -> bool {
        self.defaulted_components.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub candidate: CandidateRecord,
    pub score: ScoreBreakdown,
}
