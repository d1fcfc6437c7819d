//! Host-facing engine operations.
//!
//! Ties composition, evaluation, history analysis, optimization and upgrade
//! advice together. Everything here except [`advise`] is synchronous and
//! pure.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{error, info};

use crate::agents::{guidance_or_fallback, GuidanceContext, GuidanceGenerator};
use crate::calculate::{analyze, evaluate};
use crate::compose::{compose, Policy};
use crate::models::{
    CardPool, Deck, DeckMetrics, Guidance, GuidanceSource, MatchHistoryStats, MatchRecord,
    UpgradeSuggestion,
};
use crate::optimize::optimize;

pub use crate::upgrade::suggest_upgrades;

/// A composed deck with its metrics and upgrade list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckResult {
    pub policy: Policy,
    pub deck: Deck,
    pub metrics: DeckMetrics,
    pub upgrades: Vec<UpgradeSuggestion>,
}

impl DeckResult {
    /// Empty deck with zeroed metrics, used when a policy fails.
    fn placeholder(policy: Policy) -> Self {
        Self {
            policy,
            deck: Deck::empty(),
            metrics: DeckMetrics::default(),
            upgrades: Vec::new(),
        }
    }
}

/// A deck composed and then optimized against match history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDeckResult {
    pub policy: Policy,
    pub deck: Deck,
    pub metrics: DeckMetrics,
    pub history_stats: MatchHistoryStats,
    pub upgrades: Vec<UpgradeSuggestion>,
}

impl HistoryDeckResult {
    fn placeholder(policy: Policy, history_stats: MatchHistoryStats) -> Self {
        Self {
            policy,
            deck: Deck::empty(),
            metrics: DeckMetrics::default(),
            history_stats,
            upgrades: Vec::new(),
        }
    }
}

/// History-aware result plus narrative guidance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    #[serde(flatten)]
    pub result: HistoryDeckResult,
    pub guidance: Guidance,
    pub guidance_source: GuidanceSource,
}

pub fn compose_deck(pool: &CardPool, policy: Policy) -> DeckResult {
    let deck = compose(pool, policy);
    let metrics = evaluate(&deck);
    let upgrades = suggest_upgrades(&deck);
    DeckResult {
        policy,
        deck,
        metrics,
        upgrades,
    }
}

/// Compose one deck per policy.
///
/// Each policy runs in isolation: a panic while composing one deck is
/// logged and replaced by an empty placeholder, the others are unaffected.
pub fn compose_all_policies(pool: &CardPool) -> BTreeMap<Policy, DeckResult> {
    compose_isolated(pool, compose_deck)
}

fn compose_isolated<F>(pool: &CardPool, composer: F) -> BTreeMap<Policy, DeckResult>
where
    F: Fn(&CardPool, Policy) -> DeckResult,
{
    isolate_policies(|policy| composer(pool, policy), DeckResult::placeholder)
}

/// Run `compose` once per policy, substituting `placeholder` for any policy
/// that panics.
fn isolate_policies<T, F, P>(compose: F, placeholder: P) -> BTreeMap<Policy, T>
where
    F: Fn(Policy) -> T,
    P: Fn(Policy) -> T,
{
    Policy::ALL
        .into_iter()
        .map(|policy| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| compose(policy)))
                .unwrap_or_else(|_| {
                    error!("Composing the {} deck failed; returning an empty deck", policy);
                    placeholder(policy)
                });
            (policy, result)
        })
        .collect()
}

/// Compose with `policy`, then optimize against `history`.
///
/// An empty history leaves the composed deck unchanged.
pub fn compose_with_history(
    pool: &CardPool,
    history: &[MatchRecord],
    policy: Policy,
) -> HistoryDeckResult {
    let history_stats = analyze(history, &pool.names());
    compose_optimized(pool, &history_stats, policy)
}

/// History-aware deck for every policy, analyzing `history` once.
///
/// Policies are isolated as in [`compose_all_policies`]; a failed policy
/// yields an empty deck that still carries the shared statistics.
pub fn compose_all_policies_with_history(
    pool: &CardPool,
    history: &[MatchRecord],
) -> BTreeMap<Policy, HistoryDeckResult> {
    let history_stats = analyze(history, &pool.names());
    all_with_stats(pool, &history_stats, compose_optimized)
}

fn all_with_stats<F>(
    pool: &CardPool,
    stats: &MatchHistoryStats,
    composer: F,
) -> BTreeMap<Policy, HistoryDeckResult>
where
    F: Fn(&CardPool, &MatchHistoryStats, Policy) -> HistoryDeckResult,
{
    isolate_policies(
        |policy| composer(pool, stats, policy),
        |policy| HistoryDeckResult::placeholder(policy, stats.clone()),
    )
}

fn compose_optimized(
    pool: &CardPool,
    history_stats: &MatchHistoryStats,
    policy: Policy,
) -> HistoryDeckResult {
    let composed = compose(pool, policy);
    let deck = optimize(&composed, pool, history_stats);
    let metrics = evaluate(&deck);
    let upgrades = suggest_upgrades(&deck);

    info!(
        "Built {} deck from {} cards and {} battles (score {:.1})",
        policy,
        pool.len(),
        history_stats.total_battles,
        metrics.deck_score
    );

    HistoryDeckResult {
        policy,
        deck,
        metrics,
        history_stats: history_stats.clone(),
        upgrades,
    }
}

/// Full advice: history-aware deck plus guidance, falling back to templated
/// guidance when the generator fails.
pub async fn advise(
    pool: &CardPool,
    history: &[MatchRecord],
    policy: Policy,
    generator: &dyn GuidanceGenerator,
) -> Advice {
    let result = compose_with_history(pool, history, policy);
    let ctx = GuidanceContext {
        deck: &result.deck,
        metrics: &result.metrics,
        stats: &result.history_stats,
    };
    let (guidance, guidance_source) = guidance_or_fallback(generator, &ctx).await;

    Advice {
        result,
        guidance,
        guidance_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::backend::MockBackend;
    use crate::agents::{CoachAgent, DisabledGenerator};
    use crate::models::DECK_SIZE;
    use crate::test_support::{match_record, pool, scenario_pool};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Three wins with Archers, two losses with Knight.
    fn knight_struggles() -> Vec<MatchRecord> {
        vec![
            match_record(&["Archers", "Hog Rider"], &["Balloon"], (2, 0), Some(30)),
            match_record(&["Knight", "Hog Rider"], &["Balloon"], (0, 1), Some(-29)),
            match_record(&["Archers", "Hog Rider"], &["Golem"], (3, 0), Some(31)),
            match_record(&["Knight", "Hog Rider"], &["Golem"], (1, 2), Some(-28)),
            match_record(&["Archers", "Hog Rider"], &["Balloon"], (1, 0), Some(30)),
        ]
    }

    #[test]
    fn test_compose_deck_scenario() {
        let result = compose_deck(&scenario_pool(), Policy::Balanced);

        assert_eq!(result.policy, Policy::Balanced);
        assert_eq!(
            result.deck.names(),
            vec![
                "Hog Rider",
                "Zap",
                "Fireball",
                "Musketeer",
                "Cannon",
                "Knight",
                "Skeletons",
                "Ice Spirit",
            ]
        );
        assert_eq!(result.metrics.deck_size, 8);
        assert_eq!(result.metrics.spell_count, 2);
        assert_eq!(result.metrics.building_count, 1);
        let upgrades: Vec<&str> = result.upgrades.iter().map(|u| u.card_name.as_str()).collect();
        assert_eq!(upgrades, vec!["Fireball", "Musketeer", "Cannon"]);
    }

    #[test]
    fn test_compose_all_policies() {
        let results = compose_all_policies(&scenario_pool());

        assert_eq!(results.len(), Policy::ALL.len());
        for (policy, result) in &results {
            assert_eq!(*policy, result.policy);
            assert_eq!(result.deck.len(), DECK_SIZE);
        }
    }

    #[test]
    fn test_failing_policy_is_isolated() {
        let results = compose_isolated(&scenario_pool(), |pool, policy| {
            if policy == Policy::Cycle {
                panic!("cycle composer exploded");
            }
            compose_deck(pool, policy)
        });

        assert_eq!(results.len(), Policy::ALL.len());
        let cycle = &results[&Policy::Cycle];
        assert!(cycle.deck.is_empty());
        assert_eq!(cycle.metrics, DeckMetrics::default());
        assert!(cycle.upgrades.is_empty());
        assert_eq!(results[&Policy::Balanced].deck.len(), DECK_SIZE);
    }

    #[test]
    fn test_small_pool_all_policies() {
        let results = compose_all_policies(&pool(&[("Knight", 10, 3), ("Zap", 9, 2)]));
        assert!(results.values().all(|r| r.deck.len() == 2));
    }

    #[test]
    fn test_compose_with_empty_history_matches_plain_compose() {
        let pool = scenario_pool();
        let plain = compose_deck(&pool, Policy::Balanced);
        let with_history = compose_with_history(&pool, &[], Policy::Balanced);

        assert_eq!(with_history.deck, plain.deck);
        assert_eq!(with_history.metrics, plain.metrics);
        assert!(with_history.history_stats.is_empty());
    }

    #[test]
    fn test_compose_with_history_swaps_underperformer() {
        let result =
            compose_with_history(&scenario_pool(), &knight_struggles(), Policy::Balanced);

        assert_eq!(result.history_stats.total_battles, 5);
        assert_eq!(result.history_stats.wins, 3);
        assert_eq!(
            result.deck.names(),
            vec![
                "Hog Rider",
                "Zap",
                "Fireball",
                "Musketeer",
                "Cannon",
                "Archers",
                "Skeletons",
                "Ice Spirit",
            ]
        );
        assert_eq!(result.metrics.cards[5].name, "Archers");
        let upgrades: Vec<&str> = result.upgrades.iter().map(|u| u.card_name.as_str()).collect();
        assert_eq!(upgrades, vec!["Fireball", "Musketeer", "Cannon"]);
    }

    #[test]
    fn test_all_policies_with_history_share_stats() {
        let pool = scenario_pool();
        let results = compose_all_policies_with_history(&pool, &knight_struggles());

        assert_eq!(results.len(), Policy::ALL.len());
        for (policy, result) in &results {
            assert_eq!(*policy, result.policy);
            assert_eq!(result.history_stats.total_battles, 5);
            assert_eq!(result.deck.len(), DECK_SIZE);
        }
        assert_eq!(
            results[&Policy::Balanced],
            compose_with_history(&pool, &knight_struggles(), Policy::Balanced)
        );
    }

    #[test]
    fn test_failing_policy_with_history_is_isolated() {
        let pool = scenario_pool();
        let stats = analyze(&knight_struggles(), &pool.names());
        let results = all_with_stats(&pool, &stats, |pool, stats, policy| {
            if policy == Policy::SpellHeavy {
                panic!("spell composer exploded");
            }
            compose_optimized(pool, stats, policy)
        });

        assert_eq!(results.len(), Policy::ALL.len());
        let spell = &results[&Policy::SpellHeavy];
        assert!(spell.deck.is_empty());
        assert_eq!(spell.metrics, DeckMetrics::default());
        assert_eq!(spell.history_stats.total_battles, 5);
        assert_eq!(results[&Policy::Balanced].deck.len(), DECK_SIZE);
    }

    #[tokio::test]
    async fn test_advise_with_generated_guidance() {
        let reply = r#"Sure! {"summary": "Keep cycling Hog Rider.", "practiceAdvice": ["Ladder more"]}"#;
        let coach = CoachAgent::new(Arc::new(MockBackend::new(reply)));

        let advice = advise(&scenario_pool(), &knight_struggles(), Policy::Balanced, &coach).await;

        assert_eq!(advice.guidance_source, GuidanceSource::Generated);
        assert_eq!(advice.guidance.summary, "Keep cycling Hog Rider.");
        assert_eq!(advice.result.deck.len(), DECK_SIZE);
    }

    #[tokio::test]
    async fn test_advise_falls_back_without_generator() {
        let advice = advise(&scenario_pool(), &[], Policy::Balanced, &DisabledGenerator).await;

        assert_eq!(advice.guidance_source, GuidanceSource::Fallback);
        assert_eq!(
            advice.guidance.deck_recommendation.key_cards,
            vec!["Hog Rider", "Zap", "Fireball"]
        );

        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["policy"], "balanced");
        assert_eq!(json["guidance_source"], "fallback");
        assert!(json["history_stats"].is_object());
    }
}
