//! Card catalog classification.
//!
//! Roles and category memberships come from fixed name tables. The tables are
//! built once per process and shared read-only.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::debug;

use crate::models::{Card, CardId, CardPool, RawCard, RawPlayer, Role, DEFAULT_ELIXIR_COST};

/// Errors raised while turning raw records into cards.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Card record is missing required field '{field}' (index {index})")]
    MissingField { field: &'static str, index: usize },
}

type NameSet = Lazy<HashSet<&'static str>>;

static WIN_CONDITIONS: NameSet = Lazy::new(|| {
    HashSet::from([
        "Hog Rider",
        "Royal Giant",
        "Giant",
        "Golem",
        "P.E.K.K.A",
        "Lava Hound",
        "Balloon",
        "X-Bow",
        "Mortar",
        "Miner",
        "Graveyard",
        "Three Musketeers",
        "Royal Recruits",
        "Ram Rider",
    ])
});

static SPELLS: NameSet = Lazy::new(|| {
    HashSet::from([
        "Fireball",
        "Lightning",
        "Rocket",
        "Arrows",
        "Zap",
        "The Log",
        "Tornado",
        "Freeze",
        "Rage",
        "Clone",
        "Heal",
        "Mirror",
        "Poison",
        "Snowball",
        "Barbarian Barrel",
        "Earthquake",
    ])
});

static BUILDINGS: NameSet = Lazy::new(|| {
    HashSet::from([
        "Cannon",
        "Tesla",
        "Inferno Tower",
        "Bomb Tower",
        "X-Bow",
        "Mortar",
        "Elixir Collector",
        "Goblin Hut",
        "Barbarian Hut",
        "Tombstone",
        "Furnace",
        "Goblin Drill",
    ])
});

static CYCLE_CARDS: NameSet = Lazy::new(|| {
    HashSet::from([
        "Ice Spirit",
        "Skeletons",
        "Fire Spirit",
        "Heal Spirit",
        "Bats",
        "Spear Goblins",
        "Goblins",
    ])
});

static TANKS: NameSet = Lazy::new(|| {
    HashSet::from([
        "Giant",
        "Royal Giant",
        "Golem",
        "Lava Hound",
        "P.E.K.K.A",
        "Mega Knight",
        "Electro Giant",
        "Goblin Giant",
    ])
});

static ANTI_AIR: NameSet = Lazy::new(|| {
    HashSet::from([
        "Musketeer",
        "Archers",
        "Minions",
        "Minion Horde",
        "Baby Dragon",
        "Wizard",
        "Electro Wizard",
        "Ice Wizard",
        "Tesla",
        "Inferno Tower",
    ])
});

static FAST_WIN_CONDITIONS: NameSet =
    Lazy::new(|| HashSet::from(["Hog Rider", "Miner", "Balloon", "Ram Rider"]));

static HEAVY_WIN_CONDITIONS: NameSet =
    Lazy::new(|| HashSet::from(["P.E.K.K.A", "Mega Knight", "Golem"]));

static DEFENSIVE_BUILDINGS: NameSet =
    Lazy::new(|| HashSet::from(["Tesla", "Inferno Tower", "Cannon"]));

static BEATDOWN_SUPPORT: NameSet =
    Lazy::new(|| HashSet::from(["Wizard", "Baby Dragon", "Musketeer", "Archers"]));

/// Popular cards a player should have practised against.
pub const COMMON_META_CARDS: [&str; 6] = [
    "Hog Rider",
    "Balloon",
    "Mega Knight",
    "P.E.K.K.A",
    "Wizard",
    "Fireball",
];

pub fn is_win_condition(name: &str) -> bool {
    WIN_CONDITIONS.contains(name)
}

pub fn is_spell(name: &str) -> bool {
    SPELLS.contains(name)
}

pub fn is_building(name: &str) -> bool {
    BUILDINGS.contains(name)
}

pub fn is_cycle(name: &str) -> bool {
    CYCLE_CARDS.contains(name)
}

pub fn is_tank(name: &str) -> bool {
    TANKS.contains(name)
}

pub fn is_anti_air(name: &str) -> bool {
    ANTI_AIR.contains(name)
}

pub fn is_fast_win_condition(name: &str) -> bool {
    FAST_WIN_CONDITIONS.contains(name)
}

pub fn is_heavy_win_condition(name: &str) -> bool {
    HEAVY_WIN_CONDITIONS.contains(name)
}

pub fn is_defensive_building(name: &str) -> bool {
    DEFENSIVE_BUILDINGS.contains(name)
}

pub fn is_beatdown_support(name: &str) -> bool {
    BEATDOWN_SUPPORT.contains(name)
}

/// Primary role of a card name. Spells take precedence over buildings.
pub fn role_for(name: &str) -> Role {
    if is_spell(name) {
        Role::Spell
    } else if is_building(name) {
        Role::Building
    } else {
        Role::Troop
    }
}

/// Classify one raw card record.
///
/// `index` is the record's position in the payload and only used for error
/// reporting.
pub fn classify(raw: &RawCard, index: usize) -> Result<Card, CatalogError> {
    let id = raw
        .id
        .ok_or(CatalogError::MissingField { field: "id", index })?;
    let name = raw
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or(CatalogError::MissingField {
            field: "name",
            index,
        })?;

    let level = raw.level.unwrap_or(1).max(1);
    let max_level = raw.max_level.unwrap_or(level).max(level);
    if raw.max_level.is_some_and(|m| m < level) {
        debug!(
            "Card '{}' reports level {} above max {}; raising max",
            name,
            level,
            raw.max_level.unwrap_or_default()
        );
    }

    let elixir_cost = match raw.elixir_cost {
        Some(cost) if cost > 0 => cost,
        _ => DEFAULT_ELIXIR_COST,
    };

    Ok(Card {
        id: CardId(id),
        role: role_for(&name),
        name,
        level,
        max_level,
        elixir_cost,
        rarity: raw.rarity.clone().unwrap_or_else(|| "common".to_string()),
        count: raw.count.unwrap_or(0),
        icon_url: raw.icon_urls.as_ref().and_then(|i| i.medium.clone()),
    })
}

/// Build the card pool from a player payload.
///
/// A payload without a `cards` list yields an empty pool. Any record missing
/// its identity fails the whole payload.
pub fn parse_player_cards(player: &RawPlayer) -> Result<CardPool, CatalogError> {
    let raw_cards = player.cards.as_deref().unwrap_or_default();
    let cards = raw_cards
        .iter()
        .enumerate()
        .map(|(i, raw)| classify(raw, i))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Classified {} cards", cards.len());
    Ok(CardPool::new(cards))
}
