//! Coach Agent.
//!
//! Asks a language model for coaching guidance on a deck and the match
//! history behind it.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use super::backend::{AiBackend, ChatMessage, ChatRequest};
use super::{AgentError, GuidanceContext, GuidanceGenerator};
use crate::models::Guidance;

/// First opening brace through last closing brace.
static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("invalid JSON object regex"));

/// Listed best cards and threats in the prompt.
const PROMPT_LIST_LIMIT: usize = 5;

/// Pull the JSON object out of a reply that may carry extra prose.
pub fn extract_json(response: &str) -> Option<&str> {
    JSON_OBJECT.find(response).map(|m| m.as_str())
}

/// LLM-backed guidance generator.
pub struct CoachAgent {
    backend: Arc<dyn AiBackend>,
    temperature: f32,
    max_tokens: u32,
}

impl CoachAgent {
    pub fn new(backend: Arc<dyn AiBackend>) -> Self {
        Self {
            backend,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn build_prompt(&self, ctx: &GuidanceContext<'_>) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(COACH_SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(ctx)),
        ]
    }

    fn parse_response(&self, response: &str) -> Result<Guidance, AgentError> {
        let json = extract_json(response).ok_or_else(|| {
            AgentError::ResponseParseError("No JSON object found in response".to_string())
        })?;

        serde_json::from_str(json).map_err(|e| {
            warn!(
                "Coach JSON parse error. Response start: {}",
                response.chars().take(200).collect::<String>()
            );
            AgentError::ResponseParseError(format!("Invalid JSON: {}", e))
        })
    }
}

fn build_user_prompt(ctx: &GuidanceContext<'_>) -> String {
    let stats = ctx.stats;
    let metrics = ctx.metrics;

    let deck: String = ctx
        .deck
        .cards()
        .iter()
        .map(|card| {
            format!(
                "- {} (Level {}, {} elixir)\n",
                card.name, card.level, card.elixir_cost
            )
        })
        .collect();
    let best: String = stats
        .best_performing_cards
        .iter()
        .take(PROMPT_LIST_LIMIT)
        .map(|card| format!("- {}: {:.1}% win rate\n", card.name, card.win_rate))
        .collect();
    let threats: String = stats
        .struggling_against
        .iter()
        .take(PROMPT_LIST_LIMIT)
        .map(|threat| format!("- {}: {:.1}% loss rate\n", threat.card_name, threat.loss_rate))
        .collect();
    let weaknesses: String = stats
        .weaknesses
        .iter()
        .map(|weakness| format!("- {}\n", weakness))
        .collect();
    let win_conditions = if metrics.win_condition_names.is_empty() {
        "None detected".to_string()
    } else {
        metrics.win_condition_names.join(", ")
    };

    format!(
        "Analyze this player's performance and deck. Provide detailed guidance based on their battle history and current deck.\n\n\
         PLAYER STATISTICS:\n\
         - Win Rate: {:.1}%\n\
         - Average Crowns Won: {:.1}\n\
         - Average Crowns Lost: {:.1}\n\
         - Trophy Change: {:+.0}\n\
         \nCURRENT DECK:\n{}\
         \nDECK STATS:\n\
         - Average Elixir: {}\n\
         - Win Conditions: {}\n\
         - Spells: {}\n\
         \nBEST PERFORMING CARDS:\n{}\
         \nSTRUGGLING AGAINST:\n{}\
         \nIDENTIFIED WEAKNESSES:\n{}{}",
        stats.win_rate,
        stats.avg_crowns_won,
        stats.avg_crowns_lost,
        stats.avg_trophy_change,
        deck,
        metrics.average_elixir,
        win_conditions,
        metrics.spell_count,
        best,
        threats,
        weaknesses,
        GUIDANCE_FORMAT
    )
}

const COACH_SYSTEM_PROMPT: &str = "You are an expert Clash Royale coach and strategist. Provide detailed, actionable gameplay advice based on player statistics and battle history. Always respond with valid JSON.";

const GUIDANCE_FORMAT: &str = r#"
Please provide a comprehensive analysis in the following JSON format:
{
  "summary": "Brief 2-3 sentence overview of the player's performance and main areas for improvement",
  "deckRecommendation": {
    "strategy": "Overall strategy this deck should follow (aggro/control/beatdown/cycle)",
    "explanation": "Why this deck works and how it addresses the player's weaknesses",
    "keyCards": ["card1", "card2", "card3"],
    "playStyle": "How to play this deck effectively"
  },
  "gameplayTips": {
    "general": ["tip1", "tip2", "tip3"],
    "specific": ["specific tip for this deck", "another specific tip"],
    "counters": [
      {"enemy": "enemy card name", "strategy": "how to counter it"}
    ]
  },
  "upgradeAdvice": {
    "priority": ["card to upgrade first", "card to upgrade second"],
    "reasoning": "Why these upgrades will have the biggest impact"
  },
  "practiceAdvice": ["advice1", "advice2", "advice3"]
}

Focus on actionable advice that will immediately improve their performance. Be specific about timing, placement, and strategic decisions."#;

#[async_trait]
impl GuidanceGenerator for CoachAgent {
    fn name(&self) -> &'static str {
        "coach"
    }

    async fn generate_guidance(&self, ctx: &GuidanceContext<'_>) -> Result<Guidance, AgentError> {
        info!(
            "Requesting coaching guidance from {} for a {}-card deck",
            self.backend.name(),
            ctx.deck.len()
        );

        let request = ChatRequest::new(self.build_prompt(ctx))
            .with_json_mode()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.backend.chat(request).await?;
        debug!("AI response: {}", response.content);

        self.parse_response(&response.content)
    }

    async fn is_available(&self) -> bool {
        match self.backend.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("{} health check failed: {}", self.backend.name(), e);
                false
            }
        }
    }
}

/// Generator used when no AI backend is configured.
pub struct DisabledGenerator;

#[async_trait]
impl GuidanceGenerator for DisabledGenerator {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn generate_guidance(&self, _ctx: &GuidanceContext<'_>) -> Result<Guidance, AgentError> {
        Err(AgentError::Disabled)
    }

    async fn is_available(&self) -> bool {
        false
    }
}
