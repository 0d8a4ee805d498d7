//! Session actor implementation with async message handling.

use super::{
    broadcast::{EventBroadcaster, SessionObserver, SnapshotPublisher},
    config::SessionConfig,
    messages::{SessionEvent, SessionMessage},
};
use crate::game::{
    GameSession,
    catalog::Catalog,
    entities::{DrawFilter, DrawId, GameSessionView},
    errors::{SessionError, SessionResult},
};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    events: EventBroadcaster,
    snapshots: watch::Receiver<GameSessionView>,
}

impl SessionHandle {
    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> SessionResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Current state, read through the actor
    pub async fn snapshot(&self) -> SessionResult<GameSessionView> {
        self.request(|response| SessionMessage::GetSnapshot { response })
            .await
    }

    /// Immediate snapshot for a subscriber that wants to resync
    pub async fn join(&self) -> SessionResult<GameSessionView> {
        self.request(|response| SessionMessage::Join { response })
            .await
    }

    /// Ask for a draw. On success the returned view is the `Drawing` state;
    /// the card arrives later as a `card_drawn` event.
    pub async fn request_draw(&self, filter: DrawFilter) -> SessionResult<GameSessionView> {
        self.request(|response| SessionMessage::RequestDraw { filter, response })
            .await?
    }

    pub async fn reset(&self) -> SessionResult<GameSessionView> {
        self.request(|response| SessionMessage::Reset { response })
            .await
    }

    /// Count a new subscriber and get the snapshot it should render first
    pub async fn connect(&self) -> SessionResult<GameSessionView> {
        self.request(|response| SessionMessage::Connect { response })
            .await
    }

    pub async fn disconnect(&self) -> SessionResult<usize> {
        self.request(|response| SessionMessage::Disconnect { response })
            .await
    }

    /// Push transport event stream
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Latest published snapshot, without a round trip to the actor
    pub fn latest_snapshot(&self) -> GameSessionView {
        self.snapshots.borrow().clone()
    }

    pub fn watch_snapshots(&self) -> watch::Receiver<GameSessionView> {
        self.snapshots.clone()
    }

    /// Whether the actor is still accepting messages
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Reveal timer for the draw in flight
#[derive(Debug)]
struct PendingReveal {
    draw_id: DrawId,
    timer: JoinHandle<()>,
}

/// Session actor owning the single game session
pub struct SessionActor {
    /// Session configuration
    config: SessionConfig,

    /// Draw state machine
    session: GameSession,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Reveal timers post the draw id here when they fire
    reveal_tx: mpsc::UnboundedSender<DrawId>,
    reveal_rx: mpsc::UnboundedReceiver<DrawId>,

    /// Timer of the draw in flight, aborted on reset
    pending_reveal: Option<PendingReveal>,

    /// Card selection randomness
    rng: StdRng,

    /// Everyone interested in state changes, notified in order
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(catalog: Catalog, config: SessionConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        let (reveal_tx, reveal_rx) = mpsc::unbounded_channel();

        let session = GameSession::new(catalog);
        let events = EventBroadcaster::new(config.broadcast_capacity.max(1));
        let publisher = SnapshotPublisher::new(session.snapshot());
        let snapshots = publisher.subscribe();

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let actor = Self {
            config,
            session,
            inbox,
            reveal_tx,
            reveal_rx,
            pending_reveal: None,
            rng,
            observers: vec![Arc::new(events.clone()), Arc::new(publisher)],
        };

        let handle = SessionHandle {
            sender,
            events,
            snapshots,
        };

        (actor, handle)
    }

    /// Attach an extra observer, notified after the built-in transports
    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Run the session actor event loop until every handle is dropped
    pub async fn run(mut self) {
        log::info!(
            "Session starting with {} card(s), reveal delay {} ms",
            self.session.deck().catalog().len(),
            self.config.reveal_delay_ms
        );

        loop {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => break,
                },

                Some(draw_id) = self.reveal_rx.recv() => {
                    self.reveal(draw_id);
                }
            }
        }

        if let Some(pending) = self.pending_reveal.take() {
            pending.timer.abort();
        }

        log::info!("Session closed");
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Join { response } => {
                log::debug!("Subscriber requested a snapshot");
                let _ = response.send(self.session.snapshot());
            }

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.session.snapshot());
            }

            SessionMessage::RequestDraw { filter, response } => {
                let result = self.handle_draw(filter);
                let _ = response.send(result);
            }

            SessionMessage::Reset { response } => {
                let view = self.handle_reset();
                let _ = response.send(view);
            }

            SessionMessage::Connect { response } => {
                let count = self.session.connect();
                let view = self.session.snapshot();
                log::info!("Participant connected ({} online)", count);
                let _ = response.send(view.clone());
                self.notify(|observer| observer.on_participants_changed(count, &view));
            }

            SessionMessage::Disconnect { response } => {
                let count = self.session.disconnect();
                let view = self.session.snapshot();
                log::info!("Participant disconnected ({} online)", count);
                let _ = response.send(count);
                self.notify(|observer| observer.on_participants_changed(count, &view));
            }
        }
    }

    fn notify(&self, f: impl Fn(&dyn SessionObserver)) {
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }

    /// Accept or reject a draw request
    fn handle_draw(&mut self, filter: DrawFilter) -> SessionResult<GameSessionView> {
        let draw_id = match self.session.begin_draw(&filter) {
            Ok(draw_id) => draw_id,
            Err(e) => {
                log::debug!("Draw rejected ({}): {}", filter, e);
                return Err(e);
            }
        };

        log::info!("Draw {} accepted ({})", draw_id, filter);
        self.schedule_reveal(draw_id);

        let view = self.session.snapshot();
        self.notify(|observer| observer.on_state_changed(&view));
        Ok(view)
    }

    /// Start the reveal timer for an accepted draw
    fn schedule_reveal(&mut self, draw_id: DrawId) {
        let delay = self.config.reveal_delay();
        let reveal_tx = self.reveal_tx.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = reveal_tx.send(draw_id);
        });

        if let Some(previous) = self.pending_reveal.replace(PendingReveal { draw_id, timer }) {
            log::warn!(
                "Draw {} still had a reveal timer when draw {} was accepted",
                previous.draw_id,
                draw_id
            );
            previous.timer.abort();
        }
    }

    /// Timer fired: resolve the draw and broadcast the card
    fn reveal(&mut self, draw_id: DrawId) {
        if self
            .pending_reveal
            .as_ref()
            .is_some_and(|pending| pending.draw_id == draw_id)
        {
            self.pending_reveal = None;
        }

        match self.session.resolve_draw(draw_id, &mut self.rng) {
            Ok(card) => {
                log::info!("Draw {} revealed card {}", draw_id, card);
                let view = self.session.snapshot();
                self.notify(|observer| observer.on_card_drawn(&card, &view));
            }
            Err(SessionError::StaleDraw(id)) => {
                log::debug!("Discarding reveal for cancelled draw {}", id);
            }
            Err(e) => {
                // Candidate capture went wrong; the session is back to Idle.
                log::error!("Draw {} could not be revealed: {}", draw_id, e);
                let view = self.session.snapshot();
                self.notify(|observer| observer.on_state_changed(&view));
            }
        }
    }

    /// Restore the deck, cancelling any pending reveal
    fn handle_reset(&mut self) -> GameSessionView {
        if let Some(pending) = self.pending_reveal.take() {
            pending.timer.abort();
        }

        match self.session.reset() {
            Some(draw_id) => log::info!("Session reset, draw {} cancelled", draw_id),
            None => log::info!("Session reset"),
        }

        let view = self.session.snapshot();
        self.notify(|observer| observer.on_reset());
        self.notify(|observer| observer.on_state_changed(&view));
        view
    }
}

/// Spawn a session actor on the current runtime and return its handle
pub fn spawn_session(catalog: Catalog, config: SessionConfig) -> SessionHandle {
    let (actor, handle) = SessionActor::new(catalog, config);
    tokio::spawn(actor.run());
    handle
}
