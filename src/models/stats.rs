//! Match history statistics models.

use serde::{Deserialize, Serialize};

/// Usage of one of the player's own cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardUsage {
    pub name: String,
    /// Matches the card was played in
    pub usage: u32,
    /// Percent, 0-100
    pub win_rate: f64,
    pub avg_level: f64,
}

/// Win rate of a card backed by enough observations to rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPerformance {
    pub name: String,
    /// Percent, 0-100
    pub win_rate: f64,
    pub usage: u32,
}

/// How often the player loses against an opponent card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentThreat {
    pub card_name: String,
    /// Percent, 0-100
    pub loss_rate: f64,
    pub encounters: u32,
}

/// Results per game mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameModeStat {
    pub mode: String,
    /// Percent, 0-100
    pub win_rate: f64,
    pub battles: u32,
}

/// Aggregate statistics over a battle log.
///
/// Recomputed per request. An empty log yields the `Default` value: every
/// count zero and every list empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryStats {
    pub total_battles: u32,
    /// Strictly more crowns than the opponent
    pub wins: u32,
    /// Strictly fewer crowns than the opponent
    pub losses: u32,
    /// Percent, 0-100
    pub win_rate: f64,
    pub avg_trophy_change: f64,
    pub avg_crowns_won: f64,
    pub avg_crowns_lost: f64,
    pub three_crown_wins: u32,
    /// Crown difference of at most one
    pub close_games: u32,

    pub most_used_cards: Vec<CardUsage>,
    pub best_performing_cards: Vec<CardPerformance>,
    pub best_performing_card: Option<String>,
    pub worst_performing_card: Option<String>,
    pub unused_cards: Vec<String>,

    pub struggling_against: Vec<OpponentThreat>,
    pub best_defended_against: Option<String>,
    pub worst_defended_against: Option<String>,
    /// Common meta cards never seen on the opponent side
    pub undefended_against: Vec<String>,

    pub best_game_modes: Vec<GameModeStat>,

    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl MatchHistoryStats {
    /// Battles that ended level on crowns.
    pub fn draws(&self) -> u32 {
        self.total_battles - self.wins - self.losses
    }

    pub fn is_empty(&self) -> bool {
        self.total_battles == 0
    }

    /// Usage entry for a card, if it was among the most used.
    pub fn usage_of(&self, name: &str) -> Option<&CardUsage> {
        self.most_used_cards.iter().find(|c| c.name == name)
    }
}
