//! Deck metrics and scoring.

use std::collections::BTreeMap;

use crate::catalog;
use crate::models::{CardSummary, Deck, DeckMetrics, Role, IDEAL_AVG_ELIXIR};

use super::round1;

/// Win conditions beyond this count add nothing to the score.
const SCORED_WIN_CONDITIONS: u32 = 2;
const POINTS_PER_WIN_CONDITION: f64 = 20.0;
/// Spells beyond this count add nothing to the score.
const SCORED_SPELLS: u32 = 3;
const POINTS_PER_SPELL: f64 = 15.0;
const POINTS_PER_LEVEL: f64 = 5.0;
const MAX_CURVE_POINTS: f64 = 20.0;
/// Curve points lost per elixir of distance from the ideal average.
const CURVE_PENALTY: f64 = 10.0;

/// Compute the metrics of a deck.
///
/// The deck score is an opinionated heuristic, not a measure of win
/// probability. Its weights are the constants at the top of this module:
///
/// ```text
/// min(win_conditions, 2) * 20
///   + min(spells, 3) * 15
///   + average_level * 5
///   + max(0, 20 - |average_cost - 3.8| * 10)
/// ```
///
/// The score uses the unrounded averages and is rounded to one decimal at
/// the end. An empty deck yields all-zero metrics.
pub fn evaluate(deck: &Deck) -> DeckMetrics {
    if deck.is_empty() {
        return DeckMetrics::default();
    }

    let cards = deck.cards();
    let size = cards.len() as f64;

    let total_elixir: u32 = cards.iter().map(|c| c.elixir_cost).sum();
    let avg_elixir = total_elixir as f64 / size;
    let avg_level = cards.iter().map(|c| c.level as f64).sum::<f64>() / size;

    let count_role = |role: Role| cards.iter().filter(|c| c.role == role).count() as u32;
    let spell_count = count_role(Role::Spell);
    let building_count = count_role(Role::Building);
    let troop_count = count_role(Role::Troop);

    let win_condition_names: Vec<String> = cards
        .iter()
        .filter(|c| catalog::is_win_condition(&c.name))
        .map(|c| c.name.clone())
        .collect();
    let win_conditions = win_condition_names.len() as u32;

    let mut cost_distribution = BTreeMap::new();
    for card in cards {
        *cost_distribution.entry(card.elixir_cost).or_insert(0) += 1;
    }

    let score = win_conditions.min(SCORED_WIN_CONDITIONS) as f64 * POINTS_PER_WIN_CONDITION
        + spell_count.min(SCORED_SPELLS) as f64 * POINTS_PER_SPELL
        + avg_level * POINTS_PER_LEVEL
        + (MAX_CURVE_POINTS - (avg_elixir - IDEAL_AVG_ELIXIR).abs() * CURVE_PENALTY).max(0.0);

    DeckMetrics {
        deck_size: cards.len() as u32,
        total_elixir,
        average_elixir: round1(avg_elixir),
        average_level: round1(avg_level),
        spell_count,
        building_count,
        troop_count,
        win_conditions,
        win_condition_names,
        cost_distribution,
        deck_score: round1(score),
        cards: cards
            .iter()
            .map(|c| CardSummary {
                name: c.name.clone(),
                level: c.level,
                unified_level: c.unified_level(),
                elixir: c.elixir_cost,
                rarity: c.rarity.clone(),
            })
            .collect(),
    }
}
