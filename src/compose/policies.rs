//! One composition algorithm per policy.

use super::selection::{
    best_position, by_cost_asc, by_cost_asc_then_level_desc, by_level_desc, Selection,
};
use crate::catalog;
use crate::models::{Card, Role, IDEAL_AVG_ELIXIR};

fn is_spell(card: &Card) -> bool {
    card.role == Role::Spell
}

/// Role coverage first, then a cost-aware fill.
///
/// The fill step alternates between the cheapest and the highest-level card
/// depending on whether the running average cost sits above the ideal.
pub(super) fn balanced(sel: &mut Selection<'_>) {
    sel.pick_highest_level(|c| catalog::is_win_condition(&c.name));

    let spells = sel.candidates(is_spell);
    let spells = sel.sorted(spells, by_level_desc);
    sel.extend(&spells, 2);

    sel.pick_highest_level(|c| catalog::is_anti_air(&c.name));
    sel.pick_highest_level(|c| catalog::is_building(&c.name));

    let remaining = sel.candidates(|_| true);
    let mut remaining = sel.sorted(remaining, by_level_desc);

    while !sel.is_full() && !remaining.is_empty() {
        let pool = sel.pool();
        let pos = if sel.average_cost() > IDEAL_AVG_ELIXIR {
            best_position(pool, &remaining, |c, best| {
                c.elixir_cost < best.elixir_cost
                    || (c.elixir_cost == best.elixir_cost && c.level > best.level)
            })
        } else {
            best_position(pool, &remaining, |c, best| {
                c.level > best.level || (c.level == best.level && c.elixir_cost > best.elixir_cost)
            })
        };

        match pos {
            Some(pos) => {
                let idx = remaining.remove(pos);
                sel.push(idx);
            }
            None => break,
        }
    }
}

/// Cheap cycle cards and a fast win condition.
pub(super) fn aggro(sel: &mut Selection<'_>) {
    let all = sel.candidates(|_| true);
    let available = sel.sorted(all, by_cost_asc_then_level_desc);

    let cycle: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&i| catalog::is_cycle(&sel.card(i).name))
        .collect();
    sel.extend(&cycle, 3);

    let fast_win = available
        .iter()
        .copied()
        .find(|&i| !sel.contains(i) && catalog::is_fast_win_condition(&sel.card(i).name));
    if let Some(idx) = fast_win {
        sel.push(idx);
    }

    let spells: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&i| is_spell(sel.card(i)))
        .collect();
    sel.extend(&spells, 2);

    let cheap: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&i| sel.card(i).elixir_cost <= 4)
        .collect();
    sel.fill(&cheap);

    sel.fill(&available);
}

/// Defensive building, heavy spell support and a heavy win condition.
pub(super) fn control(sel: &mut Selection<'_>) {
    sel.pick_highest_level(|c| catalog::is_defensive_building(&c.name));

    let spells = sel.candidates(is_spell);
    let spells = sel.sorted(spells, by_level_desc);
    sel.extend(&spells, 3);

    sel.pick_highest_level(|c| catalog::is_heavy_win_condition(&c.name));

    fill_by_level(sel);
}

pub(super) fn spell_heavy(sel: &mut Selection<'_>) {
    let spells = sel.candidates(is_spell);
    let spells = sel.sorted(spells, by_level_desc);
    sel.extend(&spells, 4);

    fill_by_level(sel);
}

/// Strongest cards regardless of role.
pub(super) fn high_level(sel: &mut Selection<'_>) {
    let all = sel.candidates(|_| true);
    let sorted = sel.sorted(all, |a, b| {
        by_level_desc(a, b).then_with(|| b.level_ratio().total_cmp(&a.level_ratio()))
    });
    sel.fill(&sorted);
}

/// As many cheap cards as possible.
pub(super) fn cycle(sel: &mut Selection<'_>) {
    let cycle = sel.candidates(|c| catalog::is_cycle(&c.name));
    sel.extend(&cycle, 4);

    let cheap = sel.candidates(|c| c.elixir_cost <= 3);
    let cheap = sel.sorted(cheap, by_cost_asc_then_level_desc);
    sel.fill(&cheap);

    let rest = sel.candidates(|_| true);
    let rest = sel.sorted(rest, by_cost_asc);
    sel.fill(&rest);
}

/// A tank with ranged support behind it.
pub(super) fn beatdown(sel: &mut Selection<'_>) {
    sel.pick_highest_level(|c| catalog::is_tank(&c.name));

    let support = sel.candidates(|c| catalog::is_beatdown_support(&c.name));
    sel.extend(&support, 2);

    let spells = sel.candidates(is_spell);
    sel.extend(&spells, 2);

    fill_by_level(sel);
}

fn fill_by_level(sel: &mut Selection<'_>) {
    let rest = sel.candidates(|_| true);
    let rest = sel.sorted(rest, by_level_desc);
    sel.fill(&rest);
}
