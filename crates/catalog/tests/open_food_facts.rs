//! Exercises the Open Food Facts client against a local stub catalog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use leafscore_catalog::{OpenFoodFactsClient, DEFAULT_USER_AGENT};
use leafscore_core::{CatalogClient, CatalogError, Grade};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Recorded {
    params: Arc<Mutex<Vec<HashMap<String, String>>>>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub catalog");
    let address = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{address}")
}

async fn search(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorded.params.lock().expect("params lock").push(params);
    if let Some(agent) = headers.get(USER_AGENT).and_then(|value| value.to_str().ok()) {
        recorded.user_agents.lock().expect("agents lock").push(agent.to_string());
    }

    Json(json!({
        "count": 2,
        "products": [
            {
                "product_name": "Choco Crunch Cereal",
                "nutriscore_grade": "d",
                "nova_group": 4,
                "ecoscore_grade": "c"
            },
            {
                "product_name": "Organic Oat Cereal",
                "nutriscore_grade": "b",
                "nova_group": "2",
                "ecoscore_grade": null
            }
        ]
    }))
}

fn client(base_url: &str) -> OpenFoodFactsClient {
    OpenFoodFactsClient::new(base_url, Duration::from_secs(2)).expect("client")
}

#[tokio::test]
async fn lookup_sends_raw_query_and_decodes_candidates() {
    let recorded = Recorded::default();
    let router =
        Router::new().route("/cgi/search.pl", get(search)).with_state(recorded.clone());
    let base_url = serve(router).await;

    let candidates = client(&base_url).lookup("Choco Crunch & Co 500g").await.expect("lookup");

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].name, "Choco Crunch Cereal");
    assert_eq!(candidates[0].nutrition_grade, Grade::D);
    assert_eq!(candidates[1].processing_level.map(|level| level.get()), Some(2));
    assert_eq!(candidates[1].eco_grade, Grade::Unknown);

    let params = recorded.params.lock().expect("params lock").clone();
    assert_eq!(params.len(), 1);
    let params = &params[0];
    assert_eq!(params.get("search_terms").map(String::as_str), Some("Choco Crunch & Co 500g"));
    assert_eq!(params.get("search_simple").map(String::as_str), Some("1"));
    assert_eq!(params.get("json").map(String::as_str), Some("1"));
    assert_eq!(params.get("page_size").map(String::as_str), Some("20"));

    let agents = recorded.user_agents.lock().expect("agents lock").clone();
    assert_eq!(agents, vec![DEFAULT_USER_AGENT.to_string()]);
}

#[tokio::test]
async fn zero_matches_is_an_empty_success() {
    let router = Router::new()
        .route("/cgi/search.pl", get(|| async { Json(json!({"count": 0, "products": []})) }));
    let base_url = serve(router).await;

    let candidates = client(&base_url).lookup("unobtainium snack").await.expect("lookup");

    assert!(candidates.is_empty());
}

#[tokio::test]
async fn error_status_is_a_network_error() {
    let router = Router::new()
        .route("/cgi/search.pl", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }));
    let base_url = serve(router).await;

    let error = client(&base_url).lookup("oat milk").await.expect_err("503 should fail");

    assert!(matches!(error, CatalogError::Network(ref message) if message.contains("503")));
}

#[tokio::test]
async fn undecodable_body_is_a_parse_error() {
    let router = Router::new()
        .route("/cgi/search.pl", get(|| async { "<html>maintenance</html>" }));
    let base_url = serve(router).await;

    let error = client(&base_url).lookup("oat milk").await.expect_err("html should fail");

    assert!(matches!(error, CatalogError::Parse(_)));
}

#[tokio::test]
async fn slow_catalog_times_out_as_network_error() {
    let router = Router::new().route(
        "/cgi/search.pl",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"products": []}))
        }),
    );
    let base_url = serve(router).await;
    let client =
        OpenFoodFactsClient::new(&base_url, Duration::from_millis(100)).expect("client");

    let error = client.lookup("oat milk").await.expect_err("should time out");

    assert!(matches!(error, CatalogError::Network(ref message) if message.contains("timed out")));
}

#[tokio::test]
async fn unreachable_catalog_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);

    let error =
        client(&format!("http://{address}")).lookup("oat milk").await.expect_err("refused");

    assert!(matches!(error, CatalogError::Network(_)));
}
