use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::catalog::parse_player_cards;
use crate::compose::Policy;
use crate::engine::{
    advise, compose_all_policies, compose_all_policies_with_history, compose_deck, Advice,
    DeckResult, HistoryDeckResult,
};
use crate::models::{MatchRecord, RawBattle, RawPlayer};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRequest {
    #[serde(default)]
    pub player_data: Option<RawPlayer>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub include_battle_analysis: bool,
    /// Battle log to analyze instead of fetching one by tag
    #[serde(default)]
    pub battle_log: Option<Vec<RawBattle>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DecksResponse {
    Single(DeckResult),
    Advised(Box<Advice>),
    All {
        strategies: BTreeMap<Policy, DeckResult>,
        total_cards: usize,
    },
    AllWithHistory {
        strategies: BTreeMap<Policy, HistoryDeckResult>,
        total_cards: usize,
        battle_log_size: usize,
    },
}

/// `POST /api/decks`
pub async fn create_decks(
    State(state): State<AppState>,
    payload: Result<Json<DeckRequest>, JsonRejection>,
) -> Result<Json<DecksResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Some(player_data) = request.player_data.filter(|p| p.cards.is_some()) else {
        return Err(ApiError::BadRequest(
            "Player data with cards is required".to_string(),
        ));
    };

    let pool = parse_player_cards(&player_data)?;
    if pool.is_empty() {
        return Err(ApiError::BadRequest(
            "No valid cards found for this player".to_string(),
        ));
    }

    let policy = request.strategy.as_deref().and_then(|s| match s.parse::<Policy>() {
        Ok(policy) => Some(policy),
        Err(e) => {
            debug!("{}; composing every policy", e);
            None
        }
    });

    if !request.include_battle_analysis {
        let response = match policy {
            Some(policy) => DecksResponse::Single(compose_deck(&pool, policy)),
            None => DecksResponse::All {
                strategies: compose_all_policies(&pool),
                total_cards: pool.len(),
            },
        };
        return Ok(Json(response));
    }

    let history = match request.battle_log {
        Some(log) => MatchRecord::from_battle_log(&log),
        None => fetch_history(&state, player_data.tag.as_deref()).await,
    };

    let response = match policy {
        Some(policy) => DecksResponse::Advised(Box::new(
            advise(&pool, &history, policy, state.generator.as_ref()).await,
        )),
        None => DecksResponse::AllWithHistory {
            strategies: compose_all_policies_with_history(&pool, &history),
            total_cards: pool.len(),
            battle_log_size: history.len(),
        },
    };
    Ok(Json(response))
}

/// Fetch and convert the player's battle log. Any failure yields an empty
/// history.
async fn fetch_history(state: &AppState, tag: Option<&str>) -> Vec<MatchRecord> {
    let (Some(client), Some(tag)) = (state.royale.as_ref(), tag) else {
        debug!("No game-data client or player tag; analyzing an empty history");
        return Vec::new();
    };

    match client.fetch_battle_log(tag).await {
        Ok(log) => MatchRecord::from_battle_log(&log),
        Err(e) => {
            warn!("Failed to fetch battle log for {}: {}", tag, e);
            Vec::new()
        }
    }
}
