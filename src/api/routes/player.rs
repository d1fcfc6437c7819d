use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::fetch::RoyaleClient;

#[derive(Debug, Deserialize)]
pub struct PlayerParams {
    pub tag: Option<String>,
}

fn client(state: &AppState) -> Result<Arc<RoyaleClient>, ApiError> {
    state.royale.clone().ok_or_else(|| {
        ApiError::Unavailable("Game-data API token not configured".to_string())
    })
}

/// `GET /api/player?tag=`: player profile passthrough.
pub async fn player(
    State(state): State<AppState>,
    Query(params): Query<PlayerParams>,
) -> Result<Json<Value>, ApiError> {
    let tag = params
        .tag
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Player tag is required".to_string()))?;

    let player = client(&state)?.fetch_player_json(&tag).await?;
    Ok(Json(player))
}

/// `GET /api/battlelog/:tag`: battle log passthrough.
pub async fn battle_log(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let log = client(&state)?.fetch_battle_log_json(&tag).await?;
    Ok(Json(log))
}
