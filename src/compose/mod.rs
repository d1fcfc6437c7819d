//! Deck composition.
//!
//! Builds a deck from a card pool according to a named policy. Composition
//! is pure and deterministic: the same pool in the same order always yields
//! the same deck.
//!
//! - Every policy picks each pool card at most once.
//! - Categories with no eligible card are skipped; later fill steps cover
//!   the slot.
//! - Pools with fewer than eight cards produce an undersized deck.

mod policies;
mod selection;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{CardPool, Deck};

use selection::Selection;

/// A named deck-composition strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    #[default]
    Balanced,
    Aggro,
    Control,
    SpellHeavy,
    HighLevel,
    Cycle,
    Beatdown,
}

impl Policy {
    /// Every policy, in presentation order.
    pub const ALL: [Policy; 7] = [
        Policy::Balanced,
        Policy::Aggro,
        Policy::Control,
        Policy::SpellHeavy,
        Policy::HighLevel,
        Policy::Cycle,
        Policy::Beatdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Balanced => "balanced",
            Policy::Aggro => "aggro",
            Policy::Control => "control",
            Policy::SpellHeavy => "spell_heavy",
            Policy::HighLevel => "high_level",
            Policy::Cycle => "cycle",
            Policy::Beatdown => "beatdown",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown deck policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Policy::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

/// Compose a deck from `pool` using `policy`.
pub fn compose(pool: &CardPool, policy: Policy) -> Deck {
    let mut sel = Selection::new(pool.cards());

    match policy {
        Policy::Balanced => policies::balanced(&mut sel),
        Policy::Aggro => policies::aggro(&mut sel),
        Policy::Control => policies::control(&mut sel),
        Policy::SpellHeavy => policies::spell_heavy(&mut sel),
        Policy::HighLevel => policies::high_level(&mut sel),
        Policy::Cycle => policies::cycle(&mut sel),
        Policy::Beatdown => policies::beatdown(&mut sel),
    }

    let deck = sel.into_deck();
    debug!(
        "Composed {} deck with {} of {} pool cards",
        policy,
        deck.len(),
        pool.len()
    );
    deck
}
