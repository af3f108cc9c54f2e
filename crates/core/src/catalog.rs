use async_trait::async_trait;

use crate::domain::candidate::CandidateRecord;
use crate::errors::CatalogError;

/// Text search against the external product catalog.
///
/// Implementations send the query exactly as given (no normalization), never retry, and
/// report "no results" as an empty vector rather than an error.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Vec<CandidateRecord>, CatalogError>;
}
