use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use leafscore_core::RecommendationEngine;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    engine: Arc<RecommendationEngine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub cache: HealthCheck,
    pub cached_queries: usize,
    pub checked_at: String,
}

pub fn router(engine: Arc<RecommendationEngine>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { engine })
}

/// Reports local readiness only; probing the catalog here would spend third-party quota.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let cached_queries = state.engine.cache().len();

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "leafscore-server runtime initialized".to_string(),
        },
        cache: HealthCheck {
            status: "ready",
            detail: format!("{cached_queries} catalog lookups cached"),
        },
        cached_queries,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
