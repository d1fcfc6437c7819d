//! Narrative coaching agents.
//!
//! Guidance is an enrichment on top of the deterministic engine. Every
//! generator is reached through [`GuidanceGenerator`], and
//! [`guidance_or_fallback`] substitutes templated guidance whenever a
//! generator fails.

pub mod backend;
pub mod coach;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    CounterTip, Deck, DeckMetrics, DeckRecommendation, GameplayTips, Guidance, GuidanceSource,
    MatchHistoryStats, UpgradeAdvice,
};

pub use coach::{CoachAgent, DisabledGenerator};

/// Errors that can occur during agent execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("AI backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("AI response unparseable: {0}")]
    ResponseParseError(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Guidance generation is disabled")]
    Disabled,
}

/// Everything a generator may look at.
#[derive(Debug, Clone, Copy)]
pub struct GuidanceContext<'a> {
    pub deck: &'a Deck,
    pub metrics: &'a DeckMetrics,
    pub stats: &'a MatchHistoryStats,
}

/// Produces narrative guidance for a deck.
#[async_trait]
pub trait GuidanceGenerator: Send + Sync {
    /// Generator identifier for logging.
    fn name(&self) -> &'static str;

    async fn generate_guidance(&self, ctx: &GuidanceContext<'_>) -> Result<Guidance, AgentError>;

    /// Whether generation can currently succeed.
    async fn is_available(&self) -> bool;
}

/// Ask `generator` for guidance, falling back to the templated guidance on
/// any failure.
pub async fn guidance_or_fallback(
    generator: &dyn GuidanceGenerator,
    ctx: &GuidanceContext<'_>,
) -> (Guidance, GuidanceSource) {
    match generator.generate_guidance(ctx).await {
        Ok(guidance) => {
            debug!("Guidance generated by {}", generator.name());
            (guidance, GuidanceSource::Generated)
        }
        Err(AgentError::Disabled) => (fallback_guidance(ctx), GuidanceSource::Fallback),
        Err(e) => {
            warn!("{} failed, using fallback guidance: {}", generator.name(), e);
            (fallback_guidance(ctx), GuidanceSource::Fallback)
        }
    }
}

/// Deterministic guidance built from the deck and statistics alone.
pub fn fallback_guidance(ctx: &GuidanceContext<'_>) -> Guidance {
    Guidance {
        summary: format!(
            "Based on your {:.1}% win rate, focus on improving deck synergy and card levels.",
            ctx.stats.win_rate
        ),
        deck_recommendation: DeckRecommendation {
            strategy: "balanced".to_string(),
            explanation: "This deck provides a good mix of offense and defense suitable for your current performance level.".to_string(),
            key_cards: leading_names(ctx.deck, 3),
            play_style: "Focus on positive elixir trades and counter-attacks.".to_string(),
        },
        gameplay_tips: GameplayTips {
            general: to_strings(&[
                "Always count elixir and track opponent's cards",
                "Don't overcommit on offense",
                "Practice proper card placement timing",
            ]),
            specific: to_strings(&[
                "Use your win conditions when you have an elixir advantage",
                "Save spells for maximum value targets",
            ]),
            counters: vec![
                CounterTip {
                    enemy: "Hog Rider".to_string(),
                    strategy: "Place building in center to pull, then counter-push".to_string(),
                },
                CounterTip {
                    enemy: "Balloon".to_string(),
                    strategy: "Use air-targeting troops immediately".to_string(),
                },
            ],
        },
        upgrade_advice: UpgradeAdvice {
            priority: leading_names(ctx.deck, 2),
            reasoning: "Focus on upgrading your main win conditions first for maximum impact."
                .to_string(),
        },
        practice_advice: to_strings(&[
            "Watch replays of your losses to identify mistakes",
            "Practice specific matchups in friendly battles",
            "Learn optimal card placement positions",
        ]),
    }
}

fn leading_names(deck: &Deck, n: usize) -> Vec<String> {
    deck.cards().iter().take(n).map(|c| c.name.clone()).collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::evaluate;
    use crate::compose::{compose, Policy};
    use crate::test_support::scenario_pool;

    struct FailingGenerator;

    #[async_trait]
    impl GuidanceGenerator for FailingGenerator {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate_guidance(
            &self,
            _ctx: &GuidanceContext<'_>,
        ) -> Result<Guidance, AgentError> {
            Err(AgentError::Timeout(60))
        }

        async fn is_available(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_fallback_guidance() {
        let deck = compose(&scenario_pool(), Policy::Balanced);
        let metrics = evaluate(&deck);
        let stats = MatchHistoryStats {
            win_rate: 52.34,
            ..Default::default()
        };
        let ctx = GuidanceContext {
            deck: &deck,
            metrics: &metrics,
            stats: &stats,
        };

        let guidance = fallback_guidance(&ctx);
        assert_eq!(
            guidance.summary,
            "Based on your 52.3% win rate, focus on improving deck synergy and card levels."
        );
        assert_eq!(
            guidance.deck_recommendation.key_cards,
            vec!["Hog Rider", "Zap", "Fireball"]
        );
        assert_eq!(guidance.upgrade_advice.priority, vec!["Hog Rider", "Zap"]);
        assert_eq!(guidance.gameplay_tips.counters.len(), 2);
        assert_eq!(guidance.practice_advice.len(), 3);
    }

    #[test]
    fn test_fallback_guidance_empty_deck() {
        let deck = Deck::empty();
        let metrics = DeckMetrics::default();
        let stats = MatchHistoryStats::default();
        let ctx = GuidanceContext {
            deck: &deck,
            metrics: &metrics,
            stats: &stats,
        };

        let guidance = fallback_guidance(&ctx);
        assert!(guidance.deck_recommendation.key_cards.is_empty());
        assert!(guidance.summary.contains("0.0%"));
    }

    #[tokio::test]
    async fn test_guidance_or_fallback_on_error() {
        let deck = Deck::empty();
        let metrics = DeckMetrics::default();
        let stats = MatchHistoryStats::default();
        let ctx = GuidanceContext {
            deck: &deck,
            metrics: &metrics,
            stats: &stats,
        };

        let (guidance, source) = guidance_or_fallback(&FailingGenerator, &ctx).await;
        assert_eq!(source, GuidanceSource::Fallback);
        assert_eq!(guidance, fallback_guidance(&ctx));

        let (_, source) = guidance_or_fallback(&DisabledGenerator, &ctx).await;
        assert_eq!(source, GuidanceSource::Fallback);
    }
}
