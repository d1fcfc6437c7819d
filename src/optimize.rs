//! Insight-driven deck optimization.
//!
//! Runs after any composition policy. Cards the match history marks as
//! underperforming are swapped for better-performing pool cards of the same
//! role and similar cost.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Card, CardPool, Deck, MatchHistoryStats};

const TOP_PERFORMER_PRIORITY: i32 = 100;
const RANK_STEP: i32 = 5;
const UNDERPERFORMER_PENALTY: i32 = -50;
/// Most-used cards below this win rate are penalized.
const UNDERPERFORMER_WIN_RATE: f64 = 45.0;
/// Largest elixir difference allowed between a card and its replacement.
const MAX_COST_GAP: u32 = 1;

/// Priority per card name derived from match history.
///
/// Best-performing cards present in the pool get `100 - rank * 5`. Most-used
/// cards with a win rate below 45% get an additional -50. Names absent from
/// the map have priority zero.
pub fn card_priorities(pool: &CardPool, stats: &MatchHistoryStats) -> HashMap<String, i32> {
    let mut priorities = HashMap::new();

    for (rank, perf) in stats.best_performing_cards.iter().enumerate() {
        if pool.get(&perf.name).is_some() {
            priorities.insert(
                perf.name.clone(),
                TOP_PERFORMER_PRIORITY - rank as i32 * RANK_STEP,
            );
        }
    }

    for usage in &stats.most_used_cards {
        if usage.win_rate < UNDERPERFORMER_WIN_RATE {
            *priorities.entry(usage.name.clone()).or_insert(0) += UNDERPERFORMER_PENALTY;
        }
    }

    priorities
}

/// Swap underperforming deck cards for better pool alternatives.
///
/// A single left-to-right pass: each slot whose card has negative priority
/// is replaced by the highest-priority pool card (first on ties) that is not
/// already in the deck, has the same role, costs within one elixir and has
/// strictly higher priority. A slot with no such candidate is kept.
pub fn optimize(deck: &Deck, pool: &CardPool, stats: &MatchHistoryStats) -> Deck {
    let priorities = card_priorities(pool, stats);
    let priority = |card: &Card| priorities.get(&card.name).copied().unwrap_or(0);

    let mut optimized = deck.clone();
    let mut swaps = 0;

    for slot in 0..optimized.len() {
        let current = &optimized.cards()[slot];
        let current_priority = priority(current);
        if current_priority >= 0 {
            continue;
        }

        let mut replacement: Option<&Card> = None;
        for candidate in pool.cards() {
            let eligible = !optimized.contains(candidate.id)
                && candidate.role == current.role
                && candidate.elixir_cost.abs_diff(current.elixir_cost) <= MAX_COST_GAP
                && priority(candidate) > current_priority;
            if !eligible {
                continue;
            }
            match replacement {
                Some(best) if priority(candidate) <= priority(best) => {}
                _ => replacement = Some(candidate),
            }
        }

        if let Some(card) = replacement {
            debug!("Replacing {} with {}", current.name, card.name);
            let card = card.clone();
            optimized.cards_mut()[slot] = card;
            swaps += 1;
        }
    }

    debug!("Optimizer made {} swaps", swaps);
    optimized
}
