//! # Deck Advisor
//!
//! A rule-driven deck builder and match-history coach for a collectible card
//! game.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (cards, decks, battles, statistics)
//! - **catalog**: Card role classification from static name tables
//! - **compose**: Deterministic deck composition, one algorithm per policy
//! - **calculate**: Deck metrics and match-history statistics
//! - **optimize**: History-driven swaps of underperforming cards
//! - **upgrade**: Upgrade priority suggestions
//! - **engine**: Host-facing operations tying the above together
//! - **agents**: AI-backed coaching guidance with a templated fallback
//! - **fetch**: Game-data API client
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod agents;
pub mod api;
pub mod calculate;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod engine;
pub mod fetch;
pub mod models;
pub mod optimize;
pub mod upgrade;

pub use models::*;

#[cfg(test)]
mod test_support;
