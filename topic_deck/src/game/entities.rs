use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::catalog::category_alias;

/// Stable identifier of a card within a catalog.
pub type CardId = u32;

/// Identifier of an accepted draw. Every accepted draw gets a fresh one so
/// a reveal can tell whether it still belongs to the pending draw.
pub type DrawId = u64;

/// Filter value that means "no constraint", as sent by the web clients.
pub const FILTER_WILDCARD: &str = "all";

/// Card difficulty. Serialized by its canonical lowercase name; parsing
/// accepts any case plus the aliases listed in [`FromStr`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Initial,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Initial,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "initial" | "beginner" | "初級" => Ok(Self::Initial),
            "intermediate" | "中級" => Ok(Self::Intermediate),
            "advanced" | "上級" => Ok(Self::Advanced),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = UnknownDifficulty;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A topic card. Cards are immutable once the catalog is built.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl Card {
    pub fn new(id: CardId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category: None,
            difficulty: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} \"{}\"", self.id, self.title)
    }
}

/// Optional category/difficulty constraint on a draw.
///
/// Missing, blank and `"all"` values are unconstrained. A difficulty that
/// doesn't parse matches no card, so the draw is rejected rather than
/// silently widened.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DrawFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl DrawFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    fn constraint(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(FILTER_WILDCARD))
    }

    /// Category constraint after wildcard normalization.
    pub fn category_constraint(&self) -> Option<&str> {
        Self::constraint(&self.category)
    }

    /// Difficulty constraint after wildcard normalization.
    pub fn difficulty_constraint(&self) -> Option<&str> {
        Self::constraint(&self.difficulty)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.category_constraint().is_none() && self.difficulty_constraint().is_none()
    }

    pub fn matches(&self, card: &Card) -> bool {
        let category_ok = match self.category_constraint() {
            None => true,
            Some(wanted) => card.category.as_deref().is_some_and(|actual| {
                actual == wanted || category_alias(wanted) == Some(actual)
            }),
        };

        let difficulty_ok = match self.difficulty_constraint() {
            None => true,
            Some(wanted) => match (wanted.parse::<Difficulty>(), card.difficulty) {
                (Ok(wanted), Some(actual)) => wanted == actual,
                _ => false,
            },
        };

        category_ok && difficulty_ok
    }
}

impl fmt::Display for DrawFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "category={}, difficulty={}",
            self.category_constraint().unwrap_or(FILTER_WILDCARD),
            self.difficulty_constraint().unwrap_or(FILTER_WILDCARD)
        )
    }
}

/// Full read-only view of the session, as rendered by clients.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSessionView {
    pub available_cards: Vec<Card>,
    pub used_cards: Vec<Card>,
    pub available_count: usize,
    pub used_count: usize,
    pub current_card: Option<Card>,
    pub is_drawing: bool,
    pub participants: usize,
}
