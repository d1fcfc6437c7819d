//! Selection state shared by the composition policies.
//!
//! A selection tracks picked cards by their position in the pool, so the same
//! card can never be picked twice within one composition run.

use std::cmp::Ordering;

use crate::models::{Card, Deck, DECK_SIZE};

pub(super) struct Selection<'a> {
    pool: &'a [Card],
    picked: Vec<usize>,
}

impl<'a> Selection<'a> {
    pub fn new(pool: &'a [Card]) -> Self {
        Self {
            pool,
            picked: Vec::with_capacity(DECK_SIZE),
        }
    }

    pub fn pool(&self) -> &'a [Card] {
        self.pool
    }

    pub fn card(&self, idx: usize) -> &'a Card {
        &self.pool[idx]
    }

    pub fn is_full(&self) -> bool {
        self.picked.len() >= DECK_SIZE
    }

    pub fn remaining_slots(&self) -> usize {
        DECK_SIZE.saturating_sub(self.picked.len())
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.picked.contains(&idx)
    }

    /// Pick a card. Already picked cards and picks past a full deck are
    /// ignored.
    pub fn push(&mut self, idx: usize) {
        if !self.is_full() && !self.contains(idx) {
            self.picked.push(idx);
        }
    }

    /// Pick up to `limit` of `indices`, in order.
    pub fn extend(&mut self, indices: &[usize], limit: usize) {
        let mut taken = 0;
        for &idx in indices {
            if taken == limit {
                break;
            }
            if !self.contains(idx) {
                self.push(idx);
                taken += 1;
            }
        }
    }

    /// Fill the remaining slots from `indices`, in order.
    pub fn fill(&mut self, indices: &[usize]) {
        self.extend(indices, self.remaining_slots());
    }

    /// Unpicked cards matching `pred`, in pool order.
    pub fn candidates(&self, pred: impl Fn(&Card) -> bool) -> Vec<usize> {
        (0..self.pool.len())
            .filter(|&i| !self.contains(i) && pred(&self.pool[i]))
            .collect()
    }

    /// Pick the highest-level unpicked card matching `pred`, if any.
    pub fn pick_highest_level(&mut self, pred: impl Fn(&Card) -> bool) {
        let candidates = self.candidates(pred);
        if let Some(pos) = best_position(self.pool, &candidates, |c, best| c.level > best.level) {
            self.push(candidates[pos]);
        }
    }

    /// Mean elixir cost of the picked cards; zero for an empty selection.
    pub fn average_cost(&self) -> f64 {
        if self.picked.is_empty() {
            return 0.0;
        }
        let total: u32 = self.picked.iter().map(|&i| self.pool[i].elixir_cost).sum();
        total as f64 / self.picked.len() as f64
    }

    /// Stable sort of pool positions by the cards they point at.
    pub fn sorted(
        &self,
        mut indices: Vec<usize>,
        cmp: impl Fn(&Card, &Card) -> Ordering,
    ) -> Vec<usize> {
        indices.sort_by(|&a, &b| cmp(&self.pool[a], &self.pool[b]));
        indices
    }

    pub fn into_deck(self) -> Deck {
        Deck::new(self.picked.into_iter().map(|i| self.pool[i].clone()).collect())
    }
}

/// Position in `indices` of the best card. A later card only replaces the
/// current best when `better(candidate, best)` holds, so ties keep the first.
pub(super) fn best_position(
    pool: &[Card],
    indices: &[usize],
    better: impl Fn(&Card, &Card) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (pos, &idx) in indices.iter().enumerate() {
        match best {
            None => best = Some(pos),
            Some(b) if better(&pool[idx], &pool[indices[b]]) => best = Some(pos),
            _ => {}
        }
    }
    best
}

pub(super) fn by_level_desc(a: &Card, b: &Card) -> Ordering {
    b.level.cmp(&a.level)
}

pub(super) fn by_cost_asc(a: &Card, b: &Card) -> Ordering {
    a.elixir_cost.cmp(&b.elixir_cost)
}

pub(super) fn by_cost_asc_then_level_desc(a: &Card, b: &Card) -> Ordering {
    by_cost_asc(a, b).then_with(|| by_level_desc(a, b))
}
