//! Upgrade suggestions for a deck.

use crate::catalog;
use crate::models::{Card, Deck, Role, UpgradeSuggestion};

/// Most suggestions returned for one deck.
pub const MAX_SUGGESTIONS: usize = 3;

/// Rank deck cards by upgrade urgency.
///
/// Lowest level first; among equal levels, the card furthest from its max
/// level comes first. Returns at most three suggestions, numbered from 1.
pub fn suggest_upgrades(deck: &Deck) -> Vec<UpgradeSuggestion> {
    let mut ranked: Vec<&Card> = deck.cards().iter().collect();
    ranked.sort_by(|a, b| {
        a.level
            .cmp(&b.level)
            .then_with(|| a.level_ratio().total_cmp(&b.level_ratio()))
    });

    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .enumerate()
        .map(|(i, card)| UpgradeSuggestion {
            card_name: card.name.clone(),
            current_level: card.level,
            max_level: card.max_level,
            priority: i as u32 + 1,
            reason: upgrade_reason(card),
        })
        .collect()
}

fn upgrade_reason(card: &Card) -> String {
    let name = &card.name;
    if catalog::is_win_condition(name) {
        format!("Win condition - {} is crucial for your deck's success", name)
    } else if card.role == Role::Spell {
        format!("Spell upgrade - Higher level {} deals more damage", name)
    } else if catalog::is_tank(name) {
        format!("Tank upgrade - More HP for {} means better push survival", name)
    } else {
        format!(
            "Support upgrade - Higher level {} improves overall deck strength",
            name
        )
    }
}
