//! Prometheus metrics for monitoring the draw session.
//!
//! Metrics are recorded through the `metrics` facade and rendered in
//! Prometheus text format by the `/metrics` endpoint.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration
//! - **WebSocket Metrics**: Active connections, messages sent/received
//! - **Session Metrics**: Draws requested/accepted/rejected, reveals, resets,
//!   participants and deck size
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use td_server::metrics;
//!
//! let handle = metrics::init_metrics().unwrap();
//! metrics::draws_requested_total("http");
//! println!("{}", handle.render());
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use topic_deck::{Card, GameSessionView, SessionError, session::SessionObserver};

/// Install the global Prometheus recorder.
///
/// The returned handle renders the scrape body for `GET /metrics`.
pub fn init_metrics() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: usize) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent(kind: &'static str) {
    metrics::counter!("websocket_messages_sent", "type" => kind).increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

/// Subscriber fell behind the event channel and was resynchronized.
pub fn websocket_lagged_total(skipped: u64) {
    metrics::counter!("websocket_lagged_events_total").increment(skipped);
}

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(limiter: &'static str) {
    metrics::counter!("rate_limit_hits_total", "limiter" => limiter).increment(1);
}

// ============================================================================
// Session Metrics
// ============================================================================

/// A draw was requested over `transport` ("http" or "ws").
pub fn draws_requested_total(transport: &'static str) {
    metrics::counter!("draws_requested_total", "transport" => transport).increment(1);
}

/// A draw was accepted and its reveal scheduled.
pub fn draws_accepted_total(transport: &'static str) {
    metrics::counter!("draws_accepted_total", "transport" => transport).increment(1);
}

/// A draw was rejected.
pub fn draws_rejected_total(transport: &'static str, error: &SessionError) {
    metrics::counter!("draws_rejected_total",
        "transport" => transport,
        "reason" => rejection_reason(error)
    )
    .increment(1);
}

/// Label value for a session error
pub fn rejection_reason(error: &SessionError) -> &'static str {
    match error {
        SessionError::DrawInProgress => "draw_in_progress",
        SessionError::NoEligibleCards => "no_eligible_cards",
        SessionError::NotFound(_) => "not_found",
        SessionError::StaleDraw(_) => "stale_draw",
        SessionError::Closed => "closed",
    }
}

/// Session observer feeding the reveal, reset and presence metrics.
#[derive(Debug, Default)]
pub struct SessionMetrics;

impl SessionObserver for SessionMetrics {
    fn on_state_changed(&self, view: &GameSessionView) {
        metrics::gauge!("deck_available_cards").set(view.available_count as f64);
        metrics::gauge!("deck_used_cards").set(view.used_count as f64);
    }

    fn on_card_drawn(&self, card: &Card, view: &GameSessionView) {
        let category = card.category.clone().unwrap_or_else(|| "none".to_string());
        metrics::counter!("cards_revealed_total", "category" => category).increment(1);
        self.on_state_changed(view);
    }

    fn on_reset(&self) {
        metrics::counter!("session_resets_total").increment(1);
    }

    fn on_participants_changed(&self, count: usize, _view: &GameSessionView) {
        metrics::gauge!("participants").set(count as f64);
    }
}
