use std::time::Duration;

use async_trait::async_trait;
use leafscore_core::config::CatalogConfig;
use leafscore_core::{CandidateRecord, CatalogClient, CatalogError};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::wire::decode_search_response;

pub const DEFAULT_USER_AGENT: &str = concat!("leafscore/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_PAGE_SIZE: u32 = 20;
const SEARCH_PATH: &str = "/cgi/search.pl";

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("could not build catalog http client: {0}")]
    Http(#[source] reqwest::Error),
}

/// Text search against an Open Food Facts compatible catalog.
#[derive(Clone, Debug)]
pub struct OpenFoodFactsClient {
    http: Client,
    search_url: String,
    page_size: u32,
    timeout: Duration,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        Self::build(base_url, timeout, DEFAULT_USER_AGENT, DEFAULT_PAGE_SIZE)
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ClientBuildError> {
        Self::build(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            config.page_size,
        )
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    fn build(
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
        page_size: u32,
    ) -> Result<Self, ClientBuildError> {
        let http =
            Client::builder().user_agent(user_agent).build().map_err(ClientBuildError::Http)?;
        let search_url = format!("{}{SEARCH_PATH}", base_url.trim().trim_end_matches('/'));

        Ok(Self { http, search_url, page_size: page_size.max(1), timeout })
    }

    fn transport_error(&self, error: &reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Network(format!(
                "catalog request timed out after {}ms",
                self.timeout.as_millis()
            ))
        } else {
            CatalogError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl CatalogClient for OpenFoodFactsClient {
    async fn lookup(&self, query: &str) -> Result<Vec<CandidateRecord>, CatalogError> {
        let page_size = self.page_size.to_string();
        let response = self
            .http
            .get(&self.search_url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| self.transport_error(&error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Network(format!("catalog returned HTTP {status}")));
        }

        let body = response.bytes().await.map_err(|error| self.transport_error(&error))?;
        let decoded = decode_search_response(&body)?;

        debug!(
            event_name = "leafscore.catalog.search_completed",
            query,
            reported_count = ?decoded.reported_count,
            candidates = decoded.candidates.len(),
            "catalog search completed"
        );

        Ok(decoded.candidates)
    }
}
