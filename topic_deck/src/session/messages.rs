//! Session actor message types.

use crate::game::{
    entities::{Card, DrawFilter, GameSessionView},
    errors::SessionResult,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Subscriber asks for an immediate snapshot
    Join {
        response: oneshot::Sender<GameSessionView>,
    },

    /// Read the current state
    GetSnapshot {
        response: oneshot::Sender<GameSessionView>,
    },

    /// Request a draw; answers with the `Drawing` snapshot when accepted
    RequestDraw {
        filter: DrawFilter,
        response: oneshot::Sender<SessionResult<GameSessionView>>,
    },

    /// Restore the deck, cancelling any pending reveal
    Reset {
        response: oneshot::Sender<GameSessionView>,
    },

    /// Subscriber connected; answers with the snapshot after counting it
    Connect {
        response: oneshot::Sender<GameSessionView>,
    },

    /// Subscriber disconnected; answers with the new participant count
    Disconnect {
        response: oneshot::Sender<usize>,
    },
}

/// Events fanned out to push subscribers, in the order the session
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Full snapshot after any change
    State { state: GameSessionView },

    /// A draw was revealed
    CardDrawn {
        card: Card,
        state: GameSessionView,
    },

    /// The deck was reset; a `State` event follows
    Reset,

    /// Participant count changed
    ParticipantsUpdate { count: usize },
}

impl SessionEvent {
    /// Short name used in logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::State { .. } => "state",
            SessionEvent::CardDrawn { .. } => "card_drawn",
            SessionEvent::Reset => "reset",
            SessionEvent::ParticipantsUpdate { .. } => "participants_update",
        }
    }
}
