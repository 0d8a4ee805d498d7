//! Draw session state machine.
//!
//! `GameSession` owns the deck, the in-flight draw and the presence count.
//! It is synchronous and knows nothing about time: accepting a draw returns
//! a [`DrawId`] and the caller decides when to resolve it. The session actor
//! wraps it with the reveal timer and the broadcast fan-out.
//!
//! ```text
//!            begin_draw (eligible cards)
//!    Idle ─────────────────────────────────▶ Drawing
//!     ▲                                        │
//!     └──────── resolve_draw / reset ──────────┘
//! ```

use rand::Rng;

use super::{
    catalog::Catalog,
    deck::Deck,
    entities::{Card, DrawFilter, DrawId, GameSessionView},
    errors::{SessionError, SessionResult},
    presence::ConnectionRegistry,
};

/// A draw that has been accepted but not yet revealed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingDraw {
    pub id: DrawId,
    pub filter: DrawFilter,
    /// Eligible cards captured at acceptance time.
    pub candidates: Vec<Card>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum DrawPhase {
    #[default]
    Idle,
    Drawing(PendingDraw),
}

impl DrawPhase {
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawPhase::Drawing(_))
    }
}

/// The single authoritative session.
#[derive(Clone, Debug)]
pub struct GameSession {
    deck: Deck,
    current_card: Option<Card>,
    phase: DrawPhase,
    presence: ConnectionRegistry,
    next_draw_id: DrawId,
}

impl GameSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            deck: Deck::new(catalog),
            current_card: None,
            phase: DrawPhase::Idle,
            presence: ConnectionRegistry::new(),
            next_draw_id: 1,
        }
    }

    /// Accept a draw and move to `Drawing`.
    ///
    /// The eligible set is captured now and reused by [`Self::resolve_draw`].
    /// Rejections leave the session untouched.
    pub fn begin_draw(&mut self, filter: &DrawFilter) -> SessionResult<DrawId> {
        if self.phase.is_drawing() {
            return Err(SessionError::DrawInProgress);
        }

        let candidates = self.deck.eligible(filter);
        if candidates.is_empty() {
            return Err(SessionError::NoEligibleCards);
        }

        let id = self.next_draw_id;
        self.next_draw_id += 1;
        self.phase = DrawPhase::Drawing(PendingDraw {
            id,
            filter: filter.clone(),
            candidates,
        });

        Ok(id)
    }

    /// Reveal the pending draw `draw_id`.
    ///
    /// Picks uniformly among the captured candidates, moves the card to the
    /// used pile and returns to `Idle`. A reveal for any other draw id is
    /// stale and changes nothing.
    pub fn resolve_draw<R: Rng>(
        &mut self,
        draw_id: DrawId,
        rng: &mut R,
    ) -> SessionResult<Card> {
        let pending = match std::mem::take(&mut self.phase) {
            DrawPhase::Drawing(pending) if pending.id == draw_id => pending,
            other => {
                self.phase = other;
                return Err(SessionError::StaleDraw(draw_id));
            }
        };

        let index = rng.random_range(0..pending.candidates.len());
        let card = self.deck.remove(pending.candidates[index].id)?;
        self.current_card = Some(card.clone());

        Ok(card)
    }

    /// Restore the full deck and cancel any pending draw.
    ///
    /// Participants are kept. Returns the id of the cancelled draw, if any.
    pub fn reset(&mut self) -> Option<DrawId> {
        let cancelled = match std::mem::take(&mut self.phase) {
            DrawPhase::Drawing(pending) => Some(pending.id),
            DrawPhase::Idle => None,
        };

        self.deck.restore();
        self.current_card = None;

        cancelled
    }

    pub fn connect(&mut self) -> usize {
        self.presence.on_connect()
    }

    pub fn disconnect(&mut self) -> usize {
        self.presence.on_disconnect()
    }

    pub fn snapshot(&self) -> GameSessionView {
        GameSessionView {
            available_cards: self.deck.available().to_vec(),
            used_cards: self.deck.used().to_vec(),
            available_count: self.deck.available().len(),
            used_count: self.deck.used().len(),
            current_card: self.current_card.clone(),
            is_drawing: self.phase.is_drawing(),
            participants: self.presence.participants(),
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.phase.is_drawing()
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current_card.as_ref()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn participants(&self) -> usize {
        self.presence.participants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{CardId, Difficulty};
    use rand::{SeedableRng, rngs::StdRng};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Card::new(1, "A", "a").with_category("team"),
            Card::new(2, "B", "b")
                .with_category("design")
                .with_difficulty(Difficulty::Advanced),
            Card::new(3, "C", "c").with_category("team"),
        ])
        .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn used_ids(session: &GameSession) -> Vec<CardId> {
        session.deck().used().iter().map(|card| card.id).collect()
    }

    #[test]
    fn test_builtin_catalog_draw_by_client_category() {
        let mut session = GameSession::new(Catalog::builtin());
        let id = session
            .begin_draw(&DrawFilter::any().with_category("学習"))
            .unwrap();
        let card = session.resolve_draw(id, &mut rng()).unwrap();
        assert_eq!(card.category.as_deref(), Some("learning"));
    }

    #[test]
    fn test_begin_draw_enters_drawing() {
        let mut session = GameSession::new(catalog());
        let id = session.begin_draw(&DrawFilter::any()).unwrap();

        assert!(session.is_drawing());
        match session.phase() {
            DrawPhase::Drawing(pending) => {
                assert_eq!(pending.id, id);
                assert_eq!(pending.candidates.len(), 3);
            }
            DrawPhase::Idle => panic!("expected drawing phase"),
        }

        let view = session.snapshot();
        assert!(view.is_drawing);
        assert_eq!(view.current_card, None);
        assert_eq!(view.available_count, 3);
    }

    #[test]
    fn test_second_draw_rejected_while_drawing() {
        let mut session = GameSession::new(catalog());
        session.begin_draw(&DrawFilter::any()).unwrap();
        let before = session.snapshot();

        assert_eq!(
            session.begin_draw(&DrawFilter::any()),
            Err(SessionError::DrawInProgress)
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_no_eligible_cards_leaves_session_untouched() {
        let mut session = GameSession::new(catalog());
        let before = session.snapshot();

        assert_eq!(
            session.begin_draw(&DrawFilter::any().with_category("career")),
            Err(SessionError::NoEligibleCards)
        );
        assert!(!session.is_drawing());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_resolve_moves_card_and_returns_to_idle() {
        let mut session = GameSession::new(catalog());
        let id = session.begin_draw(&DrawFilter::any()).unwrap();
        let card = session.resolve_draw(id, &mut rng()).unwrap();

        assert!(!session.is_drawing());
        assert_eq!(session.current_card(), Some(&card));
        assert_eq!(used_ids(&session), vec![card.id]);
        assert_eq!(session.deck().available().len(), 2);
        assert!(!session.deck().contains(card.id));
    }

    #[test]
    fn test_resolve_uses_captured_candidates() {
        let mut session = GameSession::new(catalog());
        let id = session
            .begin_draw(&DrawFilter::any().with_difficulty("advanced"))
            .unwrap();
        let card = session.resolve_draw(id, &mut rng()).unwrap();
        assert_eq!(card.id, 2);
    }

    #[test]
    fn test_stale_resolve_is_ignored() {
        let mut session = GameSession::new(catalog());
        assert_eq!(
            session.resolve_draw(1, &mut rng()),
            Err(SessionError::StaleDraw(1))
        );

        let id = session.begin_draw(&DrawFilter::any()).unwrap();
        assert_eq!(
            session.resolve_draw(id + 1, &mut rng()),
            Err(SessionError::StaleDraw(id + 1))
        );
        assert!(session.is_drawing());
    }

    #[test]
    fn test_reset_cancels_pending_draw() {
        let mut session = GameSession::new(catalog());
        let first = session.begin_draw(&DrawFilter::any()).unwrap();
        session.resolve_draw(first, &mut rng()).unwrap();
        let second = session.begin_draw(&DrawFilter::any()).unwrap();

        assert_eq!(session.reset(), Some(second));
        assert_eq!(
            session.resolve_draw(second, &mut rng()),
            Err(SessionError::StaleDraw(second))
        );

        let view = session.snapshot();
        assert_eq!(view.available_count, 3);
        assert_eq!(view.used_count, 0);
        assert_eq!(view.current_card, None);
        assert!(!view.is_drawing);
    }

    #[test]
    fn test_reset_preserves_participants() {
        let mut session = GameSession::new(catalog());
        session.connect();
        session.connect();
        session.connect();
        session.disconnect();

        assert_eq!(session.reset(), None);
        assert_eq!(session.participants(), 2);
        assert_eq!(session.snapshot().participants, 2);
    }

    #[test]
    fn test_draw_ids_are_unique() {
        let mut session = GameSession::new(catalog());
        let first = session.begin_draw(&DrawFilter::any()).unwrap();
        session.reset();
        let second = session.begin_draw(&DrawFilter::any()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_draining_the_deck() {
        let mut session = GameSession::new(catalog());
        let mut rng = rng();

        for _ in 0..3 {
            let id = session.begin_draw(&DrawFilter::any()).unwrap();
            session.resolve_draw(id, &mut rng).unwrap();
        }

        let mut used = used_ids(&session);
        used.sort_unstable();
        assert_eq!(used, vec![1, 2, 3]);
        assert!(session.deck().is_exhausted());
        assert_eq!(
            session.begin_draw(&DrawFilter::any()),
            Err(SessionError::NoEligibleCards)
        );
    }
}
