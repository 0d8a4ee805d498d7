//! WebSocket push transport.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server subscribes to the session events and counts the participant
//! 3. Server sends a `state` snapshot, then every session event in order
//!    (`state`, `card_drawn`, `reset`, `participants_update`)
//! 4. Client commands (`join`, `draw`, `reset`) are forwarded to the session;
//!    rejections come back as `error` to this socket only
//! 5. On disconnect the participant is uncounted
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3001/ws');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   switch (data.type) {
//!     case 'state': render(data.state); break;
//!     case 'card_drawn': reveal(data.card, data.state); break;
//!     case 'error': toast(data.message); break;
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: 'draw', category: 'team' }));
//! ```

use std::sync::atomic::Ordering;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use topic_deck::{DrawFilter, GameSessionView, SessionEvent, SessionHandle};
use tracing::{debug, error, info, warn};

use super::{AppState, rate_limiter::ConnectionLimits};
use crate::{logging, metrics};

/// Client messages received via WebSocket
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for a fresh snapshot
    Join,
    /// Request a draw with optional filters
    Draw {
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        difficulty: Option<String>,
    },
    /// Restore the full deck
    Reset,
}

/// Messages sent only to the socket that caused them
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerResponse {
    /// Snapshot answering a `join`, same shape as the `state` event
    State { state: GameSessionView },
    Error { message: String },
}

impl ServerResponse {
    fn error(message: impl Into<String>) -> Self {
        ServerResponse::Error {
            message: message.into(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize WebSocket message: {}", e);
            None
        }
    }
}

/// Upgrade HTTP connection to the push transport.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// A send task owns the write half and merges session events with replies
/// meant for this socket; the receive loop handles client commands until
/// the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before counting so this socket sees its own participants_update
    let mut events = state.session.subscribe();
    let initial = match state.session.connect().await {
        Ok(view) => view,
        Err(e) => {
            error!("Session unavailable for new WebSocket: {}", e);
            let _ = sender.close().await;
            return;
        }
    };

    let open = state.ws_connections.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(open);
    info!(participants = initial.participants, "WebSocket connected");

    if let Some(json) = to_json(&SessionEvent::State { state: initial }) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            disconnect(&state).await;
            return;
        }
        metrics::websocket_messages_sent("state");
    }

    let mut limits = ConnectionLimits::new(state.ws_burst_limit);
    let (response_tx, mut response_rx) = mpsc::channel::<String>(32);

    let resync = state.session.clone();
    let send_task = tokio::spawn(async move {
        loop {
            let (json, kind) = tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => match to_json(&event) {
                        Some(json) => (json, event.kind()),
                        None => continue,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "WebSocket subscriber lagged, resynchronizing");
                        metrics::websocket_lagged_total(skipped);
                        // Skip the backlog; the snapshot supersedes it
                        events = events.resubscribe();
                        match resync_snapshot(&resync).await {
                            Some(json) => (json, "state"),
                            None => break,
                        }
                    }
                    Err(RecvError::Closed) => break,
                },

                Some(json) = response_rx.recv() => (json, "response"),
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent(kind);
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                let reply = match limits.check() {
                    Ok(()) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => handle_client_message(client_msg, &state.session).await,
                        Err(e) => {
                            warn!("Failed to parse client message: {}", e);
                            Some(ServerResponse::error("Invalid message format"))
                        }
                    },
                    Err(exceeded) => {
                        warn!(limiter = exceeded.label(), "WebSocket rate limit exceeded");
                        metrics::rate_limit_hits_total(exceeded.label());
                        Some(ServerResponse::error(exceeded.client_message()))
                    }
                };

                if let Some(json) = reply.as_ref().and_then(to_json) {
                    if response_tx.send(json).await.is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                debug!("WebSocket close frame received");
                break;
            }
            Ok(Message::Binary(_)) => {
                debug!("Ignoring binary WebSocket message");
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    disconnect(&state).await;
}

async fn disconnect(state: &AppState) {
    let open = state
        .ws_connections
        .fetch_sub(1, Ordering::Relaxed)
        .saturating_sub(1);
    metrics::websocket_connections_active(open);

    match state.session.disconnect().await {
        Ok(participants) => info!(participants = participants, "WebSocket disconnected"),
        Err(e) => warn!("Disconnect not recorded: {}", e),
    }
}

async fn resync_snapshot(session: &SessionHandle) -> Option<String> {
    match session.join().await {
        Ok(state) => to_json(&SessionEvent::State { state }),
        Err(e) => {
            error!("Failed to resynchronize subscriber: {}", e);
            None
        }
    }
}

/// Forward a client command to the session.
///
/// Successful draws and resets are visible through the event stream, so
/// only `join` and failures produce a direct reply.
async fn handle_client_message(
    msg: ClientMessage,
    session: &SessionHandle,
) -> Option<ServerResponse> {
    match msg {
        ClientMessage::Join => match session.join().await {
            Ok(state) => Some(ServerResponse::State { state }),
            Err(e) => Some(ServerResponse::error(e.client_message())),
        },

        ClientMessage::Draw {
            category,
            difficulty,
        } => {
            metrics::draws_requested_total("ws");
            match session.request_draw(DrawFilter { category, difficulty }).await {
                Ok(_) => {
                    metrics::draws_accepted_total("ws");
                    None
                }
                Err(e) => {
                    metrics::draws_rejected_total("ws", &e);
                    logging::log_rejection("ws", "draw", &e);
                    Some(ServerResponse::error(e.client_message()))
                }
            }
        }

        ClientMessage::Reset => match session.reset().await {
            Ok(_) => None,
            Err(e) => Some(ServerResponse::error(e.client_message())),
        },
    }
}
