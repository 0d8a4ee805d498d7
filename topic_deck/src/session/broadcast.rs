//! Fan-out of session changes to subscribers.
//!
//! The session actor reports every change through [`SessionObserver`].
//! Two observers back the transports:
//! - [`EventBroadcaster`]: push transport, one ordered event stream per
//!   subscriber over a tokio `broadcast` channel
//! - [`SnapshotPublisher`]: pull transport, keeps the latest snapshot in a
//!   tokio `watch` channel for stateless reads
//!
//! Extra observers (metrics, audit logging) can be attached to the actor
//! without touching the state machine.

use tokio::sync::{broadcast, watch};

use super::messages::SessionEvent;
use crate::game::entities::{Card, GameSessionView};

/// Receives session changes in the order they happen.
///
/// Callbacks run inside the actor, so they must not block.
pub trait SessionObserver: Send + Sync {
    /// Any change to the deck or the drawing flag.
    fn on_state_changed(&self, _view: &GameSessionView) {}

    /// A draw was revealed; `view` is the state after the reveal.
    fn on_card_drawn(&self, _card: &Card, _view: &GameSessionView) {}

    /// The deck was reset. `on_state_changed` follows.
    fn on_reset(&self) {}

    /// The participant count changed.
    fn on_participants_changed(&self, _count: usize, _view: &GameSessionView) {}
}

/// Push transport: fan-out of [`SessionEvent`]s.
#[derive(Clone, Debug)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// New subscriber receives every event sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, event: SessionEvent) {
        // No receivers is fine: nobody is connected.
        if let Ok(receivers) = self.tx.send(event) {
            log::trace!("Event delivered to {} subscriber(s)", receivers);
        }
    }
}

impl SessionObserver for EventBroadcaster {
    fn on_state_changed(&self, view: &GameSessionView) {
        self.send(SessionEvent::State {
            state: view.clone(),
        });
    }

    fn on_card_drawn(&self, card: &Card, view: &GameSessionView) {
        self.send(SessionEvent::CardDrawn {
            card: card.clone(),
            state: view.clone(),
        });
    }

    fn on_reset(&self) {
        self.send(SessionEvent::Reset);
    }

    fn on_participants_changed(&self, count: usize, _view: &GameSessionView) {
        self.send(SessionEvent::ParticipantsUpdate { count });
    }
}

/// Pull transport: latest snapshot, readable without asking the actor.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<GameSessionView>,
}

impl SnapshotPublisher {
    pub fn new(initial: GameSessionView) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<GameSessionView> {
        self.tx.subscribe()
    }

    fn publish(&self, view: &GameSessionView) {
        self.tx.send_replace(view.clone());
    }
}

impl SessionObserver for SnapshotPublisher {
    fn on_state_changed(&self, view: &GameSessionView) {
        self.publish(view);
    }

    fn on_card_drawn(&self, _card: &Card, view: &GameSessionView) {
        self.publish(view);
    }

    fn on_participants_changed(&self, _count: usize, view: &GameSessionView) {
        self.publish(view);
    }
}
