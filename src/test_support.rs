//! Shared fixtures for unit tests.

use crate::catalog::role_for;
use crate::models::{Card, CardId, CardPool, MatchRecord, MatchSide, PlayedCard};

/// A card with its role classified from the name.
pub fn card(id: u64, name: &str, level: u32, cost: u32) -> Card {
    Card {
        id: CardId(id),
        name: name.to_string(),
        level,
        max_level: 14,
        elixir_cost: cost,
        rarity: "common".to_string(),
        count: 0,
        role: role_for(name),
        icon_url: None,
    }
}

/// Build a pool from `(name, level, cost)` triples; ids follow input order.
pub fn pool(cards: &[(&str, u32, u32)]) -> CardPool {
    CardPool::new(
        cards
            .iter()
            .enumerate()
            .map(|(i, (name, level, cost))| card(i as u64 + 1, name, *level, *cost))
            .collect(),
    )
}

/// Ten-card pool used for the balanced end-to-end scenario.
pub fn scenario_pool() -> CardPool {
    pool(&[
        ("Hog Rider", 11, 4),
        ("Fireball", 9, 4),
        ("Zap", 11, 2),
        ("Musketeer", 9, 4),
        ("Cannon", 9, 3),
        ("Knight", 11, 3),
        ("Skeletons", 11, 1),
        ("Ice Spirit", 11, 1),
        ("Minions", 9, 3),
        ("Archers", 9, 3),
    ])
}

/// A larger pool covering every category the policies look at.
pub fn full_pool() -> CardPool {
    pool(&[
        ("Hog Rider", 11, 4),
        ("Golem", 8, 8),
        ("P.E.K.K.A", 10, 7),
        ("Giant", 12, 5),
        ("Balloon", 9, 5),
        ("Fireball", 9, 4),
        ("Zap", 11, 2),
        ("Arrows", 12, 3),
        ("Poison", 8, 4),
        ("The Log", 10, 2),
        ("Cannon", 9, 3),
        ("Tesla", 11, 4),
        ("Inferno Tower", 10, 5),
        ("Musketeer", 9, 4),
        ("Wizard", 10, 5),
        ("Baby Dragon", 11, 4),
        ("Archers", 12, 3),
        ("Minions", 9, 3),
        ("Knight", 13, 3),
        ("Skeletons", 11, 1),
        ("Ice Spirit", 11, 1),
        ("Bats", 10, 2),
        ("Goblins", 12, 2),
        ("Valkyrie", 10, 4),
    ])
}

/// A ladder match with level 11 cards on both sides.
pub fn match_record(
    player_cards: &[&str],
    opponent_cards: &[&str],
    crowns: (u32, u32),
    trophy_change: Option<i32>,
) -> MatchRecord {
    let side = |names: &[&str], crowns: u32, trophy_change: Option<i32>| MatchSide {
        crowns,
        trophy_change,
        cards: names
            .iter()
            .map(|n| PlayedCard {
                name: n.to_string(),
                level: 11,
            })
            .collect(),
    };

    MatchRecord {
        battle_time: None,
        battle_type: "PvP".to_string(),
        mode: "Ladder".to_string(),
        player: side(player_cards, crowns.0, trophy_change),
        opponent: side(opponent_cards, crowns.1, trophy_change.map(|t| -t)),
    }
}
