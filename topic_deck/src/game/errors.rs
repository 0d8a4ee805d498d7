//! Session and catalog error types.

use thiserror::Error;

use super::entities::{CardId, DrawId};

/// Errors produced by session transitions.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    /// Another draw is waiting for its reveal
    #[error("a card is already being drawn")]
    DrawInProgress,

    /// No available card satisfies the filter
    #[error("no available card matches the filter")]
    NoEligibleCards,

    /// Removal targeted a card that isn't available
    #[error("card {0} is not in the available pile")]
    NotFound(CardId),

    /// Reveal for a draw that was cancelled or already resolved
    #[error("draw {0} is no longer pending")]
    StaleDraw(DrawId),

    /// The session actor has stopped
    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// Message safe to show to the participant who made the request.
    ///
    /// Internal variants are collapsed into a generic message.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::DrawInProgress => {
                "A card is being drawn right now. Please wait a moment.".to_string()
            }
            SessionError::NoEligibleCards => {
                "No cards match these filters! Change the filters or reset the deck.".to_string()
            }
            SessionError::Closed => "The game session is not running".to_string(),
            SessionError::NotFound(_) | SessionError::StaleDraw(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Whether the error is an expected, recoverable rejection.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SessionError::DrawInProgress | SessionError::NoEligibleCards
        )
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog contains no cards")]
    Empty,

    #[error("duplicate card id {0} in catalog")]
    DuplicateId(CardId),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
