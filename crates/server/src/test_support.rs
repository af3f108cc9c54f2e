use std::sync::Arc;

use async_trait::async_trait;
use leafscore_core::{
    AlternativeRanker, CandidateRecord, CatalogClient, CatalogError, Grade, LookupCache,
    ProcessingLevel, RecommendationEngine, SimilarityMatcher,
};

pub struct StubCatalog {
    response: Result<Vec<CandidateRecord>, CatalogError>,
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn lookup(&self, _query: &str) -> Result<Vec<CandidateRecord>, CatalogError> {
        self.response.clone()
    }
}

pub fn engine_from(
    response: Result<Vec<CandidateRecord>, CatalogError>,
) -> Arc<RecommendationEngine> {
    let cache = LookupCache::new(Arc::new(StubCatalog { response }));
    Arc::new(RecommendationEngine::new(
        Arc::new(cache),
        SimilarityMatcher::new(),
        AlternativeRanker::default(),
    ))
}

pub fn engine_with(candidates: Vec<CandidateRecord>) -> Arc<RecommendationEngine> {
    engine_from(Ok(candidates))
}

pub fn cereal_aisle() -> Vec<CandidateRecord> {
    vec![
        CandidateRecord::new("Choco Crunch Cereal", Grade::D, ProcessingLevel::new(4), Grade::C),
        CandidateRecord::new("Organic Oat Cereal", Grade::B, ProcessingLevel::new(2), Grade::A),
    ]
}
