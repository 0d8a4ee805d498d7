//! Available/used partition of the catalog.

use super::{
    catalog::Catalog,
    entities::{Card, CardId, DrawFilter},
    errors::{SessionError, SessionResult},
};

/// The catalog split into cards still available and cards already drawn.
///
/// Every catalog card is in exactly one of the two piles. `available` keeps
/// catalog order and `used` keeps draw order.
#[derive(Clone, Debug)]
pub struct Deck {
    catalog: Catalog,
    available: Vec<Card>,
    used: Vec<Card>,
}

impl Deck {
    pub fn new(catalog: Catalog) -> Self {
        let available = catalog.cards().to_vec();
        Self {
            catalog,
            available,
            used: Vec::new(),
        }
    }

    /// Available cards that satisfy `filter`, in catalog order.
    pub fn eligible(&self, filter: &DrawFilter) -> Vec<Card> {
        self.available
            .iter()
            .filter(|card| filter.matches(card))
            .cloned()
            .collect()
    }

    /// Move an available card to the end of the used pile.
    pub fn remove(&mut self, id: CardId) -> SessionResult<Card> {
        let index = self
            .available
            .iter()
            .position(|card| card.id == id)
            .ok_or(SessionError::NotFound(id))?;

        let card = self.available.remove(index);
        self.used.push(card.clone());
        Ok(card)
    }

    /// Put every card back into the available pile.
    pub fn restore(&mut self) {
        self.available = self.catalog.cards().to_vec();
        self.used.clear();
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.available.iter().any(|card| card.id == id)
    }

    pub fn available(&self) -> &[Card] {
        &self.available
    }

    pub fn used(&self) -> &[Card] {
        &self.used
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }
}
