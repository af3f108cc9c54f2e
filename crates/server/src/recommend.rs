use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use leafscore_core::{InterfaceError, RecommendationEngine, RecommendationResult};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct RecommendState {
    engine: Arc<RecommendationEngine>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub product_name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecommendQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    #[serde(flatten)]
    pub result: RecommendationResult,
    pub better_alternative_found: bool,
    pub correlation_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub correlation_id: String,
}

type ApiResult = Result<Json<RecommendResponse>, (StatusCode, Json<ErrorResponse>)>;

pub fn router(engine: Arc<RecommendationEngine>) -> Router {
    Router::new()
        .route("/score", post(score))
        .route("/api/v1/recommend", get(recommend))
        .with_state(RecommendState { engine })
}

pub async fn score(
    State(state): State<RecommendState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> ApiResult {
    match payload {
        Ok(Json(request)) => respond(&state, &request.product_name).await,
        Err(rejection) => {
            let correlation_id = Uuid::new_v4().to_string();
            warn!(
                event_name = "leafscore.http.body_rejected",
                correlation_id = correlation_id.as_str(),
                status = rejection.status().as_u16(),
                reason = %rejection.body_text(),
                "score request body rejected"
            );
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Request body must be JSON like {\"product_name\": \"...\"}."
                        .to_string(),
                    correlation_id,
                }),
            ))
        }
    }
}

pub async fn recommend(
    State(state): State<RecommendState>,
    Query(query): Query<RecommendQuery>,
) -> ApiResult {
    respond(&state, &query.name).await
}

async fn respond(state: &RecommendState, product_name: &str) -> ApiResult {
    let correlation_id = Uuid::new_v4().to_string();

    match state.engine.recommend_with_correlation(product_name, &correlation_id).await {
        Ok(result) => Ok(Json(RecommendResponse {
            better_alternative_found: result.has_better_alternative(),
            result,
            correlation_id,
        })),
        Err(error) => Err(error_response(error.into_interface(correlation_id))),
    }
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.user_message().to_string(),
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
