//! Integration tests for the HTTP API.
//!
//! These run entirely offline: no distributor credentials are configured,
//! so live searches fail fast and the reference catalog answers instead.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bomarr::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path = std::env::temp_dir().join(format!("bomarr-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = bomarr::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    bomarr::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["success"].as_bool().unwrap_or(false));
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database_connected"], true);
    assert_eq!(body["data"]["digikey_configured"], false);
    assert_eq!(body["data"]["mouser_configured"], false);
}

#[tokio::test]
async fn test_search_without_credentials_serves_reference_catalog() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "search_term": "STM32F407",
        "category": "processor"
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/search", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["success"].as_bool().unwrap());

    let data = &body["data"];
    assert_eq!(data["search_term"], "STM32F407");
    assert_eq!(data["category"], "processor");
    assert!(data["success"].as_bool().unwrap());
    assert!(data["total_found"].as_u64().unwrap() >= 1);
    assert!(data["sources"]["demo"].as_u64().unwrap() >= 1);

    // Both adapters reported missing credentials, so the fallback does
    // not add its own advisory on top.
    let errors = data["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    for error in errors {
        assert!(error.as_str().unwrap().contains("not configured"));
    }

    let parts: Vec<&str> = data["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["part_number"].as_str().unwrap())
        .collect();
    assert!(parts.contains(&"STM32F407VGT6"));
}

#[tokio::test]
async fn test_search_empty_term_is_rejected() {
    let app = spawn_app().await;

    let payload = serde_json::json!({ "search_term": "   " });

    let response = app
        .clone()
        .oneshot(post_json("/api/search", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_search_unknown_source_is_rejected() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "search_term": "STM32F407",
        "sources": ["newark"]
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/search", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("newark"));
}

#[tokio::test]
async fn test_search_with_empty_source_list_uses_fallback_with_advisory() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "search_term": "LM2596",
        "category": "power_regulator",
        "sources": []
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/search", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let data = &body["data"];

    assert!(data["total_found"].as_u64().unwrap() >= 1);
    assert!(data["sources"]["demo"].as_u64().unwrap() >= 1);

    // No source errors happened, so the only entry is the advisory.
    let errors = data["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("reference catalog"));
}

#[tokio::test]
async fn test_search_unknown_category_without_match_finds_nothing() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "search_term": "ZZZZ9999",
        "category": "gibberish",
        "sources": []
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/search", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // The envelope succeeds; the search itself reports no matches.
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["total_found"], 0);
}

#[tokio::test]
async fn test_batch_preserves_request_order() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "searches": [
            { "search_term": "STM32F407", "category": "processor" },
            { "search_term": "LM2596", "category": "power_regulator" }
        ]
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/search/batch", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let data = &body["data"];

    assert_eq!(data["total_searches"], 2);
    assert!(data["total_components"].as_u64().unwrap() >= 2);
    assert!(data["timestamp"].is_string());

    let results = data["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["search_term"], "STM32F407");
    assert_eq!(results[1]["search_term"], "LM2596");
}

#[tokio::test]
async fn test_cache_status_starts_empty() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cache/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["total_cached"], 0);
    assert_eq!(body["data"]["active_components"], 0);
    assert_eq!(body["data"]["expired_components"], 0);
}

#[tokio::test]
async fn test_cache_clear_on_empty_cache() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/cache/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["deleted_count"], 0);
}

#[tokio::test]
async fn test_fallback_results_are_not_persisted_to_cache() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "search_term": "STM32F407",
        "category": "processor"
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/search", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cache/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["data"]["total_cached"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_disabled_without_recorder() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("Metrics not enabled"));
}
