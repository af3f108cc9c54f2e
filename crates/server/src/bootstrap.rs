use std::sync::Arc;

use leafscore_catalog::{ClientBuildError, OpenFoodFactsClient};
use leafscore_core::config::{AppConfig, ConfigError};
use leafscore_core::RecommendationEngine;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<RecommendationEngine>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    CatalogClient(#[from] ClientBuildError),
}

#[cfg(test)]
pub fn bootstrap(
    options: leafscore_core::config::LoadOptions,
) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "leafscore.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = OpenFoodFactsClient::from_config(&config.catalog)?;
    info!(
        event_name = "leafscore.bootstrap.catalog_configured",
        correlation_id = "bootstrap",
        search_url = client.search_url(),
        timeout_secs = config.catalog.timeout_secs,
        page_size = config.catalog.page_size,
        "catalog client configured"
    );

    let engine = RecommendationEngine::from_config(Arc::new(client), &config);
    info!(
        event_name = "leafscore.bootstrap.engine_ready",
        correlation_id = "bootstrap",
        processing_polarity = ?config.scoring.processing_polarity,
        max_distance = ?config.matching.max_distance,
        cache_max_entries = ?config.cache.max_entries,
        "recommendation engine initialized"
    );

    Ok(Application { config, engine: Arc::new(engine) })
}
