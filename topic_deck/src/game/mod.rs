//! Card draw game - catalog, deck and the session state machine.
//!
//! This module provides the synchronous core:
//! - Card catalog loading and validation
//! - Available/used deck partition with filtered eligibility
//! - Two-state draw machine (`Idle` / `Drawing`) with reset
//! - Participant presence counting

pub mod catalog;
pub mod deck;
pub mod entities;
pub mod errors;
pub mod presence;
pub mod state_machine;

pub use catalog::Catalog;
pub use deck::Deck;
pub use entities::{Card, CardId, Difficulty, DrawFilter, DrawId, GameSessionView};
pub use errors::{CatalogError, SessionError, SessionResult};
pub use presence::ConnectionRegistry;
pub use state_machine::{DrawPhase, GameSession, PendingDraw};
