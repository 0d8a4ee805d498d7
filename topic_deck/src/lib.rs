//! # Topic Deck
//!
//! A shared "draw a random topic card" session for live icebreaker games.
//! A facilitator's screen and every participant device observe the same
//! deck, and only one card can be in flight at a time even when draw
//! requests race.
//!
//! ## Core Modules
//!
//! - [`game`]: Catalog, deck partition and the `Idle`/`Drawing` state machine
//! - [`session`]: Actor that serializes all transitions, the reveal timer and
//!   the broadcast fan-out to push and pull transports
//!
//! ## Example
//!
//! ```
//! use topic_deck::{Catalog, DrawFilter, GameSession};
//!
//! let mut session = GameSession::new(Catalog::builtin());
//! let draw = session.begin_draw(&DrawFilter::any()).unwrap();
//! assert!(session.is_drawing());
//!
//! let card = session.resolve_draw(draw, &mut rand::rng()).unwrap();
//! assert_eq!(session.snapshot().current_card, Some(card));
//! ```

/// Card catalog, deck and draw state machine.
pub mod game;
pub use game::{
    Card, CardId, Catalog, CatalogError, Difficulty, DrawFilter, GameSession, GameSessionView,
    SessionError, SessionResult,
};

/// Serialized session actor and broadcast transports.
pub mod session;
pub use session::{SessionActor, SessionConfig, SessionEvent, SessionHandle, spawn_session};
