//! Narrative coaching guidance.
//!
//! Field names follow the JSON schema the language model is asked to
//! produce, so they are camelCase on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecommendation {
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub key_cards: Vec<String>,
    #[serde(default)]
    pub play_style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterTip {
    pub enemy: String,
    pub strategy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameplayTips {
    #[serde(default)]
    pub general: Vec<String>,
    #[serde(default)]
    pub specific: Vec<String>,
    #[serde(default)]
    pub counters: Vec<CounterTip>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeAdvice {
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Coaching guidance for a deck and the history it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidance {
    pub summary: String,
    #[serde(default)]
    pub deck_recommendation: DeckRecommendation,
    #[serde(default)]
    pub gameplay_tips: GameplayTips,
    #[serde(default)]
    pub upgrade_advice: UpgradeAdvice,
    #[serde(default)]
    pub practice_advice: Vec<String>,
}

/// Where a piece of guidance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceSource {
    /// Produced by the language model
    Generated,
    /// Deterministic template built from metrics and stats
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_accepts_partial_json() {
        let json = r#"{
            "summary": "Solid player.",
            "deckRecommendation": {"strategy": "cycle", "keyCards": ["Hog Rider"]},
            "gameplayTips": {"counters": [{"enemy": "Balloon", "strategy": "Musketeer"}]}
        }"#;

        let guidance: Guidance = serde_json::from_str(json).unwrap();
        assert_eq!(guidance.summary, "Solid player.");
        assert_eq!(guidance.deck_recommendation.strategy, "cycle");
        assert_eq!(guidance.deck_recommendation.key_cards, vec!["Hog Rider"]);
        assert_eq!(guidance.gameplay_tips.counters[0].enemy, "Balloon");
        assert!(guidance.practice_advice.is_empty());
    }

    #[test]
    fn test_guidance_requires_summary() {
        let result: Result<Guidance, _> = serde_json::from_str(r#"{"practiceAdvice": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_string(&GuidanceSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }
}
