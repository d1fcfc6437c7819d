//! Core data models for the deck advisor.

mod battle;
mod card;
mod deck;
mod guidance;
mod stats;

pub use battle::*;
pub use card::*;
pub use deck::*;
pub use guidance::*;
pub use stats::*;
