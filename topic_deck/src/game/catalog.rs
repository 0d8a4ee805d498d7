//! The fixed list of cards a session draws from.

use std::{collections::HashSet, path::Path, sync::Arc};

use super::{
    entities::{Card, CardId, Difficulty},
    errors::CatalogError,
};

/// Immutable, validated card catalog. Cloning is cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    cards: Arc<[Card]>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and repeated ids.
    pub fn new(cards: Vec<Card>) -> Result<Self, CatalogError> {
        if cards.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id) {
                return Err(CatalogError::DuplicateId(card.id));
            }
        }

        Ok(Self {
            cards: cards.into(),
        })
    }

    /// Parse a JSON array of cards.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The default tech-meetup catalog.
    pub fn builtin() -> Self {
        let cards = BUILTIN_CARDS
            .iter()
            .map(|&(id, title, description, category, difficulty)| {
                Card::new(id, title, description)
                    .with_category(category)
                    .with_difficulty(difficulty)
            })
            .collect::<Vec<_>>();

        Self {
            cards: cards.into(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.cards
            .iter()
            .filter_map(|card| card.category.as_deref())
            .filter(|category| seen.insert(*category))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_CARDS: &[(CardId, &str, &str, &str, Difficulty)] = &[
    (1, "A technology you learned recently", "Talk about a language or tool you tried out lately", "learning", Difficulty::Initial),
    (2, "Your favourite programming language", "Why do you love it? Make the case", "technology", Difficulty::Initial),
    (3, "Your dev environment quirks", "Editor, terminal, tooling: what can't you live without?", "environment", Difficulty::Initial),
    (4, "Your biggest failure", "A painful project or coding mistake and what it taught you", "experience", Difficulty::Intermediate),
    (5, "Making team development work", "Things you do to keep the team running smoothly", "team", Difficulty::Intermediate),
    (6, "How you choose technology", "Your criteria when picking a stack for a new project", "design", Difficulty::Intermediate),
    (7, "Code review philosophy", "What makes a good code review?", "team", Difficulty::Intermediate),
    (8, "A performance win", "A time you made an app or system noticeably faster", "optimization", Difficulty::Advanced),
    (9, "Design patterns in practice", "A pattern that actually paid off for you", "design", Difficulty::Advanced),
    (10, "Security habits", "The security points you keep in mind while building", "security", Difficulty::Intermediate),
    (11, "Testing strategy", "How you write tests that are worth having", "quality", Difficulty::Intermediate),
    (12, "A refactoring story", "How you improved a piece of legacy code", "improvement", Difficulty::Advanced),
    (13, "API design principles", "What makes an API pleasant to use?", "design", Difficulty::Advanced),
    (14, "Database design", "What you watch out for when modelling data", "database", Difficulty::Intermediate),
    (15, "A bug you'll never forget", "The strangest bug you hit and how you fixed it", "troubleshooting", Difficulty::Intermediate),
    (16, "A library you love", "A tool that makes you noticeably more productive", "technology", Difficulty::Initial),
    (17, "The beauty of code", "What does beautiful code look like to you?", "philosophy", Difficulty::Intermediate),
    (18, "Designing for scale", "How you leave room for growth in a design", "design", Difficulty::Advanced),
    (19, "Growing as a developer", "A moment you felt yourself level up", "career", Difficulty::Initial),
    (20, "How you learn new tech", "Your personal method for picking things up fast", "learning", Difficulty::Initial),
    (21, "Product management", "Bridging technology and business", "management", Difficulty::Advanced),
    (22, "CI/CD pipelines", "Automation that improved your delivery flow", "devops", Difficulty::Intermediate),
    (23, "Using the cloud", "Practical examples from AWS, Azure or GCP", "infrastructure", Difficulty::Intermediate),
    (24, "Microservice boundaries", "How you decide where to split services", "architecture", Difficulty::Advanced),
    (25, "Monitoring strategy", "Alerts and dashboards that actually help", "operations", Difficulty::Intermediate),
    (26, "Living with tech debt", "How you approach improving an aging system", "improvement", Difficulty::Intermediate),
    (27, "Mentoring newcomers", "What worked when you helped a junior engineer", "education", Difficulty::Intermediate),
    (28, "Contributing to open source", "How you got involved in an OSS project", "community", Difficulty::Intermediate),
    (29, "A technology choice you regret", "What went wrong and what you learned", "failure", Difficulty::Advanced),
    (30, "The ideal dev team", "What does a team need to do its best work?", "team", Difficulty::Advanced),
];

/// Category names used by the original Japanese web clients, mapped to the
/// built-in catalog's slugs.
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("学習", "learning"),
    ("技術", "technology"),
    ("環境", "environment"),
    ("経験", "experience"),
    ("チーム", "team"),
    ("設計", "design"),
    ("最適化", "optimization"),
    ("セキュリティ", "security"),
    ("品質", "quality"),
    ("改善", "improvement"),
    ("データベース", "database"),
    ("トラブル", "troubleshooting"),
    ("哲学", "philosophy"),
    ("キャリア", "career"),
    ("マネジメント", "management"),
    ("DevOps", "devops"),
    ("インフラ", "infrastructure"),
    ("アーキテクチャ", "architecture"),
    ("運用", "operations"),
    ("教育", "education"),
    ("コミュニティ", "community"),
    ("失敗", "failure"),
];

/// Built-in slug for a client category name, if it is a known alias.
pub fn category_alias(name: &str) -> Option<&'static str> {
    CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, slug)| *slug)
}
