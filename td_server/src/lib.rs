//! HTTP/WebSocket server for the topic-card draw session.
//!
//! Wires a [`topic_deck::SessionActor`] to two transports: a WebSocket push
//! stream and JSON polling endpoints. See [`api`] for the routes.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
