//! Session module providing the serialized, real-time draw session.
//!
//! This module implements:
//! - SessionActor: async actor owning the single `GameSession`
//! - SessionHandle: cloneable front door used by request handlers
//! - Reveal timer per accepted draw, cancelled by reset
//! - Broadcast fan-out to push (event stream) and pull (latest snapshot)
//!   transports through the `SessionObserver` interface
//!
//! ## Architecture
//!
//! The session runs in one Tokio task with an mpsc inbox. Every mutation
//! (draw accept, reveal, reset, connect, disconnect) is handled to
//! completion before the next message is read, so filtering and removing a
//! card are atomic with respect to each other. Observers are notified in
//! the same order, which keeps push subscribers consistent with the
//! mutation order.
//!
//! ## Example
//!
//! ```no_run
//! use topic_deck::game::{Catalog, DrawFilter};
//! use topic_deck::session::{SessionActor, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = SessionActor::new(Catalog::builtin(), SessionConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     let mut events = handle.subscribe();
//!     let drawing = handle.request_draw(DrawFilter::any()).await.unwrap();
//!     assert!(drawing.is_drawing);
//!
//!     // `state` (drawing), then `card_drawn` about two seconds later
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod actor;
pub mod broadcast;
pub mod config;
pub mod messages;

pub use actor::{SessionActor, SessionHandle, spawn_session};
pub use broadcast::{EventBroadcaster, SessionObserver, SnapshotPublisher};
pub use config::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REVEAL_DELAY_MS, SessionConfig, SessionConfigError,
};
pub use messages::{SessionEvent, SessionMessage};
