//! Deck, deck metrics and upgrade suggestion models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Card, CardId};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 8;

/// Ideal average elixir cost the composer and evaluator steer toward.
pub const IDEAL_AVG_ELIXIR: f64 = 3.8;

/// An ordered selection of at most [`DECK_SIZE`] cards from one pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn empty() -> Self {
        Self::default()
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

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.name.as_str()).collect()
    }

    pub(crate) fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }
}

/// Compact card line used in metrics output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub name: String,
    pub level: u32,
    /// Level on the unified 1-16 scale
    pub unified_level: u32,
    pub elixir: u32,
    pub rarity: String,
}

/// Aggregate metrics of a deck.
///
/// Always derived from a deck, never cached across decks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckMetrics {
    pub deck_size: u32,
    pub total_elixir: u32,
    /// Rounded to one decimal
    pub average_elixir: f64,
    /// Rounded to one decimal
    pub average_level: f64,
    pub spell_count: u32,
    pub building_count: u32,
    pub troop_count: u32,
    pub win_conditions: u32,
    pub win_condition_names: Vec<String>,
    /// Elixir cost -> number of cards at that cost
    pub cost_distribution: BTreeMap<u32, u32>,
    pub deck_score: f64,
    pub cards: Vec<CardSummary>,
}

/// One card the player should level up next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeSuggestion {
    pub card_name: String,
    pub current_level: u32,
    pub max_level: u32,
    /// 1 is most urgent
    pub priority: u32,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn card(id: u64, name: &str) -> Card {
        Card {
            id: CardId(id),
            name: name.to_string(),
            level: 9,
            max_level: 14,
            elixir_cost: 3,
            rarity: "common".to_string(),
            count: 0,
            role: Role::Troop,
            icon_url: None,
        }
    }

    #[test]
    fn test_deck_contains_by_identity() {
        let deck = Deck::new(vec![card(1, "Knight"), card(2, "Archers")]);
        assert!(deck.contains(CardId(1)));
        assert!(!deck.contains(CardId(3)));
        assert_eq!(deck.names(), vec!["Knight", "Archers"]);
    }

    #[test]
    fn test_default_metrics_are_zeroed() {
        let m = DeckMetrics::default();
        assert_eq!(m.deck_size, 0);
        assert_eq!(m.deck_score, 0.0);
        assert!(m.cost_distribution.is_empty());
        assert!(m.win_condition_names.is_empty());
    }

    #[test]
    fn test_metrics_serialize_cost_distribution_keys() {
        let mut m = DeckMetrics::default();
        m.cost_distribution.insert(3, 2);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["cost_distribution"]["3"], 2);
    }
}
