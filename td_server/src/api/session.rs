//! Pull transport handlers.
//!
//! Stateless request/response endpoints over the shared session:
//! - Reading the latest snapshot
//! - Requesting a draw (acknowledged with the `Drawing` snapshot; the card
//!   shows up on a later poll)
//! - Resetting the deck
//! - Listing the catalog
//!
//! # Examples
//!
//! Draw a team card:
//! ```bash
//! curl -X POST http://localhost:3001/api/v1/draw \
//!   -H "Content-Type: application/json" \
//!   -d '{"category": "team", "difficulty": "all"}'
//! ```

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use serde::Serialize;
use topic_deck::{Card, Difficulty, DrawFilter, GameSessionView, SessionError};

use super::{AppState, request_id::RequestId};
use crate::{logging, metrics};

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    pub accepted: bool,
    pub message: String,
    pub state: GameSessionView,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ok: bool,
    pub message: String,
    pub state: GameSessionView,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub cards: Vec<Card>,
    pub categories: Vec<String>,
    pub difficulties: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(super) type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a rejected session operation
pub fn status_for(error: &SessionError) -> StatusCode {
    match error {
        SessionError::DrawInProgress => StatusCode::CONFLICT,
        SessionError::NoEligibleCards => StatusCode::BAD_REQUEST,
        SessionError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::NotFound(_) | SessionError::StaleDraw(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(super) fn session_error(error: SessionError) -> ApiError {
    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.client_message(),
        }),
    )
}

/// Parse an optional JSON filter. An empty body means no constraint.
fn parse_filter(body: &[u8]) -> Result<DrawFilter, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DrawFilter::any());
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected draw body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }),
        )
    })
}

/// Latest session snapshot.
///
/// Served from the published snapshot without a round trip to the actor.
pub async fn get_state(State(state): State<AppState>) -> Json<GameSessionView> {
    Json(state.session.latest_snapshot())
}

/// Request a draw.
///
/// # Response
///
/// `200 OK` with the accepted draw:
/// ```json
/// {
///   "accepted": true,
///   "message": "Drawing a card...",
///   "state": { "is_drawing": true, "available_count": 30, ... },
///   "poll_interval_ms": 1000
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: another draw is waiting for its reveal
/// - `400 Bad Request`: no available card matches, or the body is malformed
/// - `503 Service Unavailable`: the session has stopped
pub async fn draw(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<Json<DrawResponse>, ApiError> {
    let view = submit_draw(&state, &request_id, &body).await?;

    Ok(Json(DrawResponse {
        accepted: true,
        message: DRAW_MESSAGE.to_string(),
        state: view,
        poll_interval_ms: state.poll_interval_ms,
    }))
}

pub(super) const DRAW_MESSAGE: &str = "Drawing a card...";
pub(super) const RESET_MESSAGE: &str = "Deck reset";

/// Parse the filter and forward the draw, recording metrics either way.
pub(super) async fn submit_draw(
    state: &AppState,
    request_id: &RequestId,
    body: &[u8],
) -> Result<GameSessionView, ApiError> {
    let filter = parse_filter(body)?;
    metrics::draws_requested_total("http");

    match state.session.request_draw(filter).await {
        Ok(view) => {
            metrics::draws_accepted_total("http");
            tracing::info!(request_id = %request_id.as_str(), "Draw accepted");
            Ok(view)
        }
        Err(e) => {
            metrics::draws_rejected_total("http", &e);
            logging::log_rejection("http", "draw", &e);
            Err(session_error(e))
        }
    }
}

/// Restore the full deck, cancelling a pending draw.
pub async fn reset(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<ResetResponse>, ApiError> {
    let view = state.session.reset().await.map_err(session_error)?;
    tracing::info!(request_id = %request_id.as_str(), "Deck reset");

    Ok(Json(ResetResponse {
        ok: true,
        message: RESET_MESSAGE.to_string(),
        state: view,
    }))
}

/// Full catalog with its categories and the known difficulties.
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        cards: state.catalog.cards().to_vec(),
        categories: state.catalog.categories(),
        difficulties: Difficulty::ALL.iter().map(Difficulty::as_str).collect(),
    })
}
