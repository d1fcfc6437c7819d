//! Match history analysis.
//!
//! Turns a battle log into per-card, per-opponent-card and per-mode
//! statistics plus qualitative strengths, weaknesses and recommendations.
//! A match is a win when the player took strictly more crowns and a loss
//! when they took strictly fewer. Equal crowns only count toward the total.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::COMMON_META_CARDS;
use crate::models::{
    CardPerformance, CardUsage, GameModeStat, MatchHistoryStats, MatchRecord, OpponentThreat,
};

use super::{calculate_mean, calculate_rate_percent, calculate_ratio};

/// Observations needed before a card's rate is ranked.
pub const RELIABLE_OBSERVATIONS: u32 = 3;

const MOST_USED_LIMIT: usize = 10;
const BEST_PERFORMING_LIMIT: usize = 10;
const STRUGGLING_LIMIT: usize = 8;
const UNUSED_LIMIT: usize = 10;

const STRONG_WIN_RATE: f64 = 60.0;
const WEAK_WIN_RATE: f64 = 40.0;
const AVERAGE_WIN_RATE: f64 = 50.0;
const HIGH_CROWNS: f64 = 1.5;
const THREE_CROWN_SHARE: f64 = 0.3;
const CLOSE_GAME_SHARE: f64 = 0.6;
const TROPHY_GAIN: f64 = 10.0;
const TROPHY_LOSS: f64 = -5.0;

/// Per-name counters kept in first-seen order, so rankings that tie stay
/// in the order the names appeared in the log.
struct Tally<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T: Default> Tally<T> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn entry(&mut self, name: &str) -> &mut T {
        let pos = match self.index.get(name) {
            Some(&pos) => pos,
            None => {
                self.entries.push((name.to_string(), T::default()));
                self.index.insert(name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }
}

#[derive(Default)]
struct CardTally {
    uses: u32,
    wins: u32,
    total_level: u32,
}

#[derive(Default)]
struct OpponentTally {
    encounters: u32,
    wins: u32,
    losses: u32,
}

#[derive(Default)]
struct ModeTally {
    battles: u32,
    wins: u32,
}

/// Analyze a battle log.
///
/// `owned_cards` are the names in the player's pool; those never played in
/// the log are reported as unused. An empty log yields the default
/// statistics with every list empty.
pub fn analyze(records: &[MatchRecord], owned_cards: &[String]) -> MatchHistoryStats {
    if records.is_empty() {
        return MatchHistoryStats::default();
    }

    let total_battles = records.len() as u32;
    let wins = records.iter().filter(|r| r.is_win()).count() as u32;
    let losses = records.iter().filter(|r| r.is_loss()).count() as u32;
    let win_rate = calculate_rate_percent(wins, total_battles);

    let trophy_changes: Vec<f64> = records
        .iter()
        .filter_map(|r| r.player.trophy_change)
        .map(f64::from)
        .collect();
    let avg_trophy_change = calculate_mean(&trophy_changes);

    let crowns_won: u32 = records.iter().map(|r| r.player.crowns).sum();
    let crowns_lost: u32 = records.iter().map(|r| r.opponent.crowns).sum();
    let avg_crowns_won = calculate_ratio(crowns_won, total_battles);
    let avg_crowns_lost = calculate_ratio(crowns_lost, total_battles);
    let three_crown_wins = records.iter().filter(|r| r.player.crowns == 3).count() as u32;
    let close_games = records
        .iter()
        .filter(|r| r.player.crowns.abs_diff(r.opponent.crowns) <= 1)
        .count() as u32;

    let mut cards: Tally<CardTally> = Tally::new();
    let mut opponents: Tally<OpponentTally> = Tally::new();
    let mut modes: Tally<ModeTally> = Tally::new();

    for record in records {
        let won = record.is_win();
        let lost = record.is_loss();

        for played in &record.player.cards {
            let tally = cards.entry(&played.name);
            tally.uses += 1;
            tally.total_level += played.level;
            if won {
                tally.wins += 1;
            }
        }

        for faced in &record.opponent.cards {
            let tally = opponents.entry(&faced.name);
            tally.encounters += 1;
            if won {
                tally.wins += 1;
            }
            if lost {
                tally.losses += 1;
            }
        }

        let mode = modes.entry(&record.mode);
        mode.battles += 1;
        if won {
            mode.wins += 1;
        }
    }

    let mut most_used_cards: Vec<CardUsage> = cards
        .iter()
        .map(|(name, t)| CardUsage {
            name: name.to_string(),
            usage: t.uses,
            win_rate: calculate_rate_percent(t.wins, t.uses),
            avg_level: calculate_ratio(t.total_level, t.uses),
        })
        .collect();
    most_used_cards.sort_by(|a, b| b.usage.cmp(&a.usage));
    most_used_cards.truncate(MOST_USED_LIMIT);

    let mut reliable_cards: Vec<CardPerformance> = cards
        .iter()
        .filter(|(_, t)| t.uses >= RELIABLE_OBSERVATIONS)
        .map(|(name, t)| CardPerformance {
            name: name.to_string(),
            win_rate: calculate_rate_percent(t.wins, t.uses),
            usage: t.uses,
        })
        .collect();
    reliable_cards.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    let best_performing_card = reliable_cards.first().map(|c| c.name.clone());
    let worst_performing_card = reliable_cards.last().map(|c| c.name.clone());
    let mut best_performing_cards = reliable_cards;
    best_performing_cards.truncate(BEST_PERFORMING_LIMIT);

    let mut struggling_against: Vec<OpponentThreat> = opponents
        .iter()
        .filter(|(_, t)| t.encounters >= RELIABLE_OBSERVATIONS)
        .map(|(name, t)| OpponentThreat {
            card_name: name.to_string(),
            loss_rate: calculate_rate_percent(t.losses, t.encounters),
            encounters: t.encounters,
        })
        .collect();
    struggling_against.sort_by(|a, b| b.loss_rate.total_cmp(&a.loss_rate));
    struggling_against.truncate(STRUGGLING_LIMIT);

    let mut defended: Vec<(&str, f64)> = opponents
        .iter()
        .filter(|(_, t)| t.encounters >= RELIABLE_OBSERVATIONS)
        .map(|(name, t)| (name, calculate_ratio(t.wins, t.encounters)))
        .collect();
    defended.sort_by(|a, b| b.1.total_cmp(&a.1));
    let best_defended_against = defended.first().map(|(n, _)| n.to_string());
    let worst_defended_against = defended.last().map(|(n, _)| n.to_string());

    let undefended_against: Vec<String> = COMMON_META_CARDS
        .iter()
        .filter(|name| !opponents.contains(name))
        .map(|name| name.to_string())
        .collect();

    let unused_cards: Vec<String> = owned_cards
        .iter()
        .filter(|name| !cards.contains(name))
        .take(UNUSED_LIMIT)
        .cloned()
        .collect();

    let mut best_game_modes: Vec<GameModeStat> = modes
        .iter()
        .map(|(mode, t)| GameModeStat {
            mode: mode.to_string(),
            win_rate: calculate_rate_percent(t.wins, t.battles),
            battles: t.battles,
        })
        .collect();
    best_game_modes.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

    let three_crown_share = calculate_ratio(three_crown_wins, total_battles);
    let close_game_share = calculate_ratio(close_games, total_battles);

    let mut strengths = Vec::new();
    if win_rate > STRONG_WIN_RATE {
        strengths.push("Strong overall performance".to_string());
    }
    if avg_crowns_won > HIGH_CROWNS {
        strengths.push("Good offensive pressure".to_string());
    }
    if three_crown_share > THREE_CROWN_SHARE {
        strengths.push("Excellent at decisive victories".to_string());
    }
    if avg_trophy_change > TROPHY_GAIN {
        strengths.push("Consistently gaining trophies".to_string());
    }

    let mut weaknesses = Vec::new();
    if win_rate < WEAK_WIN_RATE {
        weaknesses.push("Below average win rate".to_string());
    }
    if avg_crowns_lost > HIGH_CROWNS {
        weaknesses.push("Struggling with defense".to_string());
    }
    if close_game_share > CLOSE_GAME_SHARE {
        weaknesses.push("Too many close games - need more decisive wins".to_string());
    }
    if avg_trophy_change < TROPHY_LOSS {
        weaknesses.push("Losing trophies consistently".to_string());
    }

    let mut recommendations = Vec::new();
    if win_rate < AVERAGE_WIN_RATE {
        recommendations.push("Focus on improving card levels and deck synergy".to_string());
    }
    if avg_crowns_lost > HIGH_CROWNS {
        recommendations.push("Add more defensive cards to your deck".to_string());
    }
    if let Some(top) = most_used_cards.first() {
        if top.win_rate < AVERAGE_WIN_RATE {
            recommendations.push(format!(
                "Consider replacing {} - low win rate despite high usage",
                top.name
            ));
        }
    }

    debug!(
        "Analyzed {} battles: {} wins, {} losses, {:.1}% win rate",
        total_battles, wins, losses, win_rate
    );

    MatchHistoryStats {
        total_battles,
        wins,
        losses,
        win_rate,
        avg_trophy_change,
        avg_crowns_won,
        avg_crowns_lost,
        three_crown_wins,
        close_games,
        most_used_cards,
        best_performing_cards,
        best_performing_card,
        worst_performing_card,
        unused_cards,
        struggling_against,
        best_defended_against,
        worst_defended_against,
        undefended_against,
        best_game_modes,
        strengths,
        weaknesses,
        recommendations,
    }
}
