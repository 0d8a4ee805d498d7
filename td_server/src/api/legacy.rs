//! Unversioned `/api/*` routes for the existing polling web client.
//!
//! That client reads camelCase state (`isDrawing`, `availableCards`, ...)
//! and checks `success` on draw and reset replies, so these handlers wrap
//! the same session calls as [`super::session`] in that shape.

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use topic_deck::{Card, GameSessionView};

use super::{
    AppState,
    request_id::RequestId,
    session::{ApiError, DRAW_MESSAGE, RESET_MESSAGE, session_error, submit_draw},
};

/// Session snapshot with the client's field names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyGameState {
    pub available_cards: Vec<Card>,
    pub used_cards: Vec<Card>,
    pub current_card: Option<Card>,
    pub is_drawing: bool,
    pub participants: usize,
}

impl From<GameSessionView> for LegacyGameState {
    fn from(view: GameSessionView) -> Self {
        Self {
            available_cards: view.available_cards,
            used_cards: view.used_cards,
            current_card: view.current_card,
            is_drawing: view.is_drawing,
            participants: view.participants,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAck {
    pub success: bool,
    pub message: String,
    pub game_state: LegacyGameState,
}

impl LegacyAck {
    fn new(message: &str, view: GameSessionView) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            game_state: view.into(),
        }
    }
}

pub async fn get_state(State(state): State<AppState>) -> Json<LegacyGameState> {
    Json(state.session.latest_snapshot().into())
}

pub async fn draw(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<Json<LegacyAck>, ApiError> {
    let view = submit_draw(&state, &request_id, &body).await?;
    Ok(Json(LegacyAck::new(DRAW_MESSAGE, view)))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<LegacyAck>, ApiError> {
    let view = state.session.reset().await.map_err(session_error)?;
    Ok(Json(LegacyAck::new(RESET_MESSAGE, view)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_state_uses_camel_case() {
        let view = GameSessionView {
            is_drawing: true,
            participants: 2,
            ..GameSessionView::default()
        };
        let json = serde_json::to_value(LegacyGameState::from(view)).unwrap();

        assert_eq!(json["isDrawing"], true);
        assert_eq!(json["participants"], 2);
        assert!(json["availableCards"].is_array());
        assert!(json["usedCards"].is_array());
        assert!(json["currentCard"].is_null());
        assert!(json.get("is_drawing").is_none());
    }

    #[test]
    fn test_legacy_ack_shape() {
        let json = serde_json::to_value(LegacyAck::new("ok", GameSessionView::default())).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "ok");
        assert_eq!(json["gameState"]["isDrawing"], false);
    }
}
