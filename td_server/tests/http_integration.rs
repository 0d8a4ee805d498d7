//! Integration tests for the pull transport and service endpoints.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use td_server::api::{AppState, create_router, request_id::REQUEST_ID_HEADER};
use topic_deck::{Card, Catalog, Difficulty, SessionActor, SessionConfig, spawn_session};
use tower::ServiceExt; // For `oneshot` method

fn test_config() -> SessionConfig {
    SessionConfig {
        rng_seed: Some(7),
        ..SessionConfig::default()
    }
}

/// Helper to create a router over a fresh session
fn create_test_app(catalog: Catalog) -> axum::Router {
    let session = spawn_session(catalog.clone(), test_config());
    create_router(AppState::new(session, catalog))
}

fn small_catalog() -> Catalog {
    Catalog::new(vec![
        Card::new(1, "Team rituals", "What keeps your team together?")
            .with_category("team")
            .with_difficulty(Difficulty::Initial),
        Card::new(2, "Scaling", "Designing for growth")
            .with_category("design")
            .with_difficulty(Difficulty::Advanced),
    ])
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app(Catalog::builtin());

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["participants"], 0);
    assert_eq!(body["available_cards"], 30);
    assert!(body["timestamp"].is_string());

    let (status, _) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_check_reports_stopped_session() {
    let catalog = Catalog::builtin();
    let (actor, session) = SessionActor::new(catalog.clone(), test_config());
    drop(actor);
    let app = create_router(AppState::new(session, catalog));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");

    let (status, body) = send(&app, post_empty("/api/v1/draw")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "The game session is not running");
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = create_test_app(Catalog::builtin());

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_test_app(Catalog::builtin());
    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let catalog = Catalog::builtin();
    let session = spawn_session(catalog.clone(), test_config());
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = create_router(AppState::new(session, catalog).with_metrics(handle));

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
}

// ============================================================================
// Pull Transport Tests
// ============================================================================

#[tokio::test]
async fn test_initial_state() {
    let app = create_test_app(Catalog::builtin());

    let (status, body) = send(&app, get("/api/v1/state")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_count"], 30);
    assert_eq!(body["used_count"], 0);
    assert_eq!(body["is_drawing"], false);
    assert_eq!(body["current_card"], Value::Null);
    assert_eq!(body["available_cards"].as_array().unwrap().len(), 30);
}

#[tokio::test(start_paused = true)]
async fn test_draw_is_acknowledged_then_revealed_on_poll() {
    let app = create_test_app(Catalog::builtin());

    let (status, body) = send(&app, post_empty("/api/v1/draw")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["poll_interval_ms"], 1000);
    assert_eq!(body["state"]["is_drawing"], true);
    assert_eq!(body["state"]["used_count"], 0);

    let (_, polled) = send(&app, get("/api/v1/state")).await;
    assert_eq!(polled["is_drawing"], true);

    tokio::time::sleep(Duration::from_millis(2_100)).await;

    let (_, polled) = send(&app, get("/api/v1/state")).await;
    assert_eq!(polled["is_drawing"], false);
    assert_eq!(polled["used_count"], 1);
    assert_eq!(polled["available_count"], 29);
    assert!(polled["current_card"]["id"].is_u64());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_draw_is_conflict() {
    let app = create_test_app(Catalog::builtin());

    let (status, _) = send(&app, post_empty("/api/v1/draw")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post_empty("/api/v1/draw")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "A card is being drawn right now. Please wait a moment."
    );
}

#[tokio::test]
async fn test_draw_with_unmatched_filter() {
    let app = create_test_app(Catalog::builtin());

    let (status, body) = send(
        &app,
        post("/api/v1/draw", json!({"category": "no-such-category"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("No cards match"));

    let (_, state) = send(&app, get("/api/v1/state")).await;
    assert_eq!(state["is_drawing"], false);
}

#[tokio::test]
async fn test_draw_with_malformed_body() {
    let app = create_test_app(Catalog::builtin());

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/draw")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test(start_paused = true)]
async fn test_filtered_draw_and_wildcards() {
    let app = create_test_app(small_catalog());

    let (status, _) = send(
        &app,
        post("/api/v1/draw", json!({"category": "design", "difficulty": "上級"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(2_100)).await;

    let (_, state) = send(&app, get("/api/v1/state")).await;
    assert_eq!(state["current_card"]["id"], 2);

    let (status, _) = send(
        &app,
        post("/api/v1/draw", json!({"category": "all", "difficulty": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(2_100)).await;

    let (_, state) = send(&app, get("/api/v1/state")).await;
    assert_eq!(state["current_card"]["id"], 1);
    assert_eq!(state["available_count"], 0);

    let (status, _) = send(&app, post_empty("/api/v1/draw")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_draw() {
    let app = create_test_app(Catalog::builtin());

    send(&app, post_empty("/api/v1/draw")).await;
    let (status, body) = send(&app, post_empty("/api/v1/reset")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["state"]["is_drawing"], false);
    assert_eq!(body["state"]["available_count"], 30);

    tokio::time::sleep(Duration::from_secs(5)).await;

    let (_, state) = send(&app, get("/api/v1/state")).await;
    assert_eq!(state["used_count"], 0);
    assert_eq!(state["current_card"], Value::Null);
}

#[tokio::test(start_paused = true)]
async fn test_legacy_routes_use_client_field_names() {
    let app = create_test_app(Catalog::builtin());

    let (status, state) = send(&app, get("/api/state")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["isDrawing"], false);
    assert_eq!(state["availableCards"].as_array().unwrap().len(), 30);
    assert!(state["usedCards"].as_array().unwrap().is_empty());
    assert_eq!(state["currentCard"], Value::Null);
    assert_eq!(state["participants"], 0);
    assert!(state.get("is_drawing").is_none());

    let (status, body) = send(&app, post("/api/draw", json!({"category": "学習"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["gameState"]["isDrawing"], true);

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    let (_, state) = send(&app, get("/api/state")).await;
    assert_eq!(state["usedCards"].as_array().unwrap().len(), 1);
    assert_eq!(state["currentCard"]["category"], "learning");

    let (status, body) = send(&app, post_empty("/api/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    assert!(body["gameState"]["usedCards"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, post("/api/draw", json!({"category": "none"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_catalog_endpoint() {
    let app = create_test_app(small_catalog());

    let (status, body) = send(&app, get("/api/v1/catalog")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cards"].as_array().unwrap().len(), 2);
    assert_eq!(body["categories"], json!(["team", "design"]));
    assert_eq!(
        body["difficulties"],
        json!(["initial", "intermediate", "advanced"])
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app(Catalog::builtin());
    let response = app.oneshot(get("/api/v1/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
