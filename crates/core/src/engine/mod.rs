pub mod matcher;
pub mod ranking;
pub mod scoring;

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::LookupCache;
use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::domain::recommendation::RecommendationResult;
use crate::errors::RecommendError;

use self::{matcher::SimilarityMatcher, ranking::AlternativeRanker, scoring::ScoreCalculator};

pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

/// One lookup, match, score and rank cycle per observed product name.
///
/// The engine never retries: a failed catalog lookup or a missing match is returned to the
/// caller as a typed error.
pub struct RecommendationEngine {
    cache: Arc<LookupCache>,
    matcher: SimilarityMatcher,
    ranker: AlternativeRanker,
    max_alternatives: usize,
}

impl RecommendationEngine {
    pub fn new(
        cache: Arc<LookupCache>,
        matcher: SimilarityMatcher,
        ranker: AlternativeRanker,
    ) -> Self {
        Self { cache, matcher, ranker, max_alternatives: DEFAULT_MAX_ALTERNATIVES }
    }

    pub fn from_config(client: Arc<dyn CatalogClient>, config: &AppConfig) -> Self {
        let cache = LookupCache::new(client).with_max_entries(config.cache.max_entries);
        let calculator = ScoreCalculator::with_polarity(config.scoring.processing_polarity);

        Self::new(
            Arc::new(cache),
            SimilarityMatcher::with_max_distance(config.matching.max_distance),
            AlternativeRanker::new(calculator),
        )
        .with_max_alternatives(config.scoring.max_alternatives)
    }

    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.max_alternatives = max_alternatives;
        self
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub async fn recommend(
        &self,
        product_name: &str,
    ) -> Result<RecommendationResult, RecommendError> {
        self.recommend_with_correlation(product_name, "unassigned").await
    }

    pub async fn recommend_with_correlation(
        &self,
        product_name: &str,
        correlation_id: &str,
    ) -> Result<RecommendationResult, RecommendError> {
        if product_name.trim().is_empty() {
            return Err(RecommendError::InvalidQuery);
        }

        let candidates = self.cache.get_or_fetch(product_name).await.map_err(|error| {
            warn!(
                event_name = "leafscore.recommend.lookup_failed",
                correlation_id,
                product_name,
                error = %error,
                "catalog lookup failed"
            );
            RecommendError::LookupFailed(error)
        })?;

        let Some(matched) = self.matcher.best_match(product_name, &candidates) else {
            info!(
                event_name = "leafscore.recommend.no_match",
                correlation_id,
                product_name,
                candidates = candidates.len(),
                max_distance = ?self.matcher.max_distance(),
                "no acceptable catalog match"
            );
            return Err(RecommendError::NoMatchFound { query: product_name.to_string() });
        };

        let current_product = candidates[matched.index].clone();
        let current_score = self.ranker.calculator().score(&current_product);
        let mut ranked = self.ranker.rank(&current_score, &candidates);

        let best = ranked.first().cloned();
        ranked.truncate(self.max_alternatives);

        info!(
            event_name = "leafscore.recommend.completed",
            correlation_id,
            product_name,
            matched_name = current_product.name.as_str(),
            match_distance = matched.distance,
            current_total = current_score.total,
            better_alternative = best.is_some(),
            "recommendation computed"
        );

        Ok(RecommendationResult {
            current_product,
            current_score,
            match_distance: matched.distance,
            best_alternative: best.as_ref().map(|scored| scored.candidate.clone()),
            best_alternative_score: best.map(|scored| scored.score),
            alternatives: ranked,
        })
    }
}
