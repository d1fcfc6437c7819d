//! Card, card pool and raw player payload models.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Elixir cost assumed when the payload omits it.
pub const DEFAULT_ELIXIR_COST: u32 = 3;

/// Highest level on the unified level scale.
pub const UNIFIED_MAX_LEVEL: u32 = 16;

/// Numeric card identity as issued by the game-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primary role of a card, derived once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Area-damage spell
    Spell,
    /// Static defense
    Building,
    /// Everything else
    #[default]
    Troop,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Spell => write!(f, "spell"),
            Role::Building => write!(f, "building"),
            Role::Troop => write!(f, "troop"),
        }
    }
}

/// Card icon links from the game-data API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IconUrls {
    #[serde(default)]
    pub medium: Option<String>,
}

/// A card as it arrives in the player payload.
///
/// Identity fields are optional here so that a malformed record can be
/// rejected with a proper error instead of a deserialization failure for
/// the whole payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub max_level: Option<u32>,
    #[serde(default)]
    pub elixir_cost: Option<u32>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub icon_urls: Option<IconUrls>,
}

/// Player profile payload. Only the fields the engine needs are modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayer {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub trophies: Option<u32>,
    #[serde(default)]
    pub exp_level: Option<u32>,
    #[serde(default)]
    pub cards: Option<Vec<RawCard>>,
}

/// A classified, owned card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub elixir_cost: u32,
    pub rarity: String,
    pub count: u32,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl Card {
    /// Fraction of the way to max level, in `0.0..=1.0`.
    pub fn level_ratio(&self) -> f64 {
        if self.max_level == 0 {
            return 0.0;
        }
        self.level as f64 / self.max_level as f64
    }

    /// Level on the unified 1-16 scale.
    ///
    /// The API still reports legacy per-rarity levels for older records;
    /// those are shifted by a rarity-specific offset and capped at
    /// [`UNIFIED_MAX_LEVEL`].
    pub fn unified_level(&self) -> u32 {
        if self.max_level >= 15 {
            return self.level;
        }
        let offset = match self.rarity.to_lowercase().as_str() {
            "legendary" => 8,
            "champion" => 10,
            "epic" => 5,
            "rare" => 2,
            _ => 0,
        };
        (self.level + offset).min(UNIFIED_MAX_LEVEL)
    }
}

/// The distinct cards one player owns, in payload order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CardPool {
    cards: Vec<Card>,
}

impl CardPool {
    /// Build a pool, dropping later cards whose name was already seen.
    pub fn new(cards: Vec<Card>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(cards.len());
        for card in cards {
            if seen.insert(card.name.clone()) {
                unique.push(card);
            } else {
                tracing::warn!("Dropping duplicate card '{}' from pool", card.name);
            }
        }
        Self { cards: unique }
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

    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.name == name)
    }

    /// Card names, in pool order.
    pub fn names(&self) -> Vec<String> {
        self.cards.iter().map(|c| c.name.clone()).collect()
    }
}
