//! Product matching and composite sustainability scoring.
//!
//! An observed product name is looked up in the external catalog through the single-flight
//! [`cache::LookupCache`], matched to its closest catalog entry, scored, and compared with the
//! other candidates to surface a strictly better alternative.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;

pub use cache::{CacheKey, Candidates, LookupCache};
pub use catalog::CatalogClient;
pub use domain::candidate::{CandidateRecord, Grade, ProcessingLevel};
pub use domain::recommendation::RecommendationResult;
pub use domain::score::{ScoreBreakdown, ScoreComponent, ScoredCandidate};
pub use engine::matcher::{levenshtein, MatchOutcome, SimilarityMatcher};
pub use engine::ranking::AlternativeRanker;
pub use engine::scoring::{ProcessingPolarity, ScoreCalculator, SCORING_WEIGHTS};
pub use engine::RecommendationEngine;
pub use errors::{CatalogError, InterfaceError, RecommendError};
