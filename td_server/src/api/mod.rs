//! HTTP/WebSocket API for the draw session.
//!
//! Two transports expose the same session:
//! - **Push**: `GET /ws` upgrades to a WebSocket that receives a snapshot on
//!   connect, then every session event in order
//! - **Pull**: stateless JSON endpoints; clients poll `GET /api/v1/state`
//!   at the interval advertised in the draw acknowledgment
//!
//! # Modules
//!
//! - [`session`]: state, draw, reset and catalog handlers
//! - [`websocket`]: push transport
//! - [`legacy`]: unversioned routes in the older client's response shape
//! - [`rate_limiter`]: per-connection WebSocket message limits
//! - [`request_id`]: request correlation middleware
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health            - Health check
//! GET  /metrics           - Prometheus scrape endpoint
//! GET  /ws                - WebSocket push transport
//! GET  /api/v1/state      - Current snapshot
//! POST /api/v1/draw       - Request a draw {category?, difficulty?}
//! POST /api/v1/reset      - Restore the full deck
//! GET  /api/v1/catalog    - Cards, categories and difficulties
//! ```
//!
//! The unversioned `/api/health`, `/api/state`, `/api/draw` and `/api/reset`
//! routes are kept for existing web clients and answer in their camelCase
//! shape (see [`legacy`]).
//!
//! # CORS
//!
//! CORS is configured permissively; the session has no authentication.

pub mod legacy;
pub mod rate_limiter;
pub mod request_id;
pub mod session;
pub mod websocket;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use topic_deck::{Catalog, SessionHandle};
use tower_http::cors::CorsLayer;

use crate::config::{DEFAULT_WS_BURST_LIMIT, ServerConfig};

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned per request; every field is a handle or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Front door of the session actor
    pub session: SessionHandle,
    /// Catalog served by `/api/v1/catalog`
    pub catalog: Catalog,
    /// Interval pull clients are told to poll at
    pub poll_interval_ms: u64,
    /// WebSocket messages per second per connection
    pub ws_burst_limit: usize,
    /// Renders `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Open WebSocket connections
    pub ws_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(session: SessionHandle, catalog: Catalog) -> Self {
        Self {
            session,
            catalog,
            poll_interval_ms: topic_deck::session::DEFAULT_POLL_INTERVAL_MS,
            ws_burst_limit: DEFAULT_WS_BURST_LIMIT,
            metrics: None,
            ws_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Take transport settings from the server configuration
    pub fn with_config(mut self, config: &ServerConfig) -> Self {
        self.poll_interval_ms = config.poll_interval_ms;
        self.ws_burst_limit = config.ws_burst_limit;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn open_connections(&self) -> usize {
        self.ws_connections.load(Ordering::Relaxed)
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// use td_server::api::{AppState, create_router};
/// use topic_deck::{Catalog, SessionConfig, spawn_session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = Catalog::builtin();
/// let session = spawn_session(catalog.clone(), SessionConfig::default());
/// let app = create_router(AppState::new(session, catalog));
///
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/ws", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        // Legacy routes
        .route("/api/health", get(health_check))
        .route("/api/state", get(legacy::get_state))
        .route("/api/draw", post(legacy::draw))
        .route("/api/reset", post(legacy::reset))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/state", get(session::get_state))
        .route("/draw", post(session::draw))
        .route("/reset", post(session::reset))
        .route("/catalog", get(session::get_catalog))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` while the session actor is running, `503 Service
/// Unavailable` once it has stopped.
///
/// ```bash
/// curl http://localhost:3001/health
/// # {"status":"healthy","version":"1.0.0","participants":2,...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = !state.session.is_closed();
    let snapshot = state.session.latest_snapshot();

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "participants": snapshot.participants,
        "available_cards": snapshot.available_count,
        "websocket_connections": state.open_connections(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics are not enabled").into_response(),
    }
}
