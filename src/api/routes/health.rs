use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Name of the configured guidance generator
    pub guidance: &'static str,
    /// Whether the guidance backend answered its health check
    pub guidance_available: bool,
    pub game_data_api: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        guidance: state.generator.name(),
        guidance_available: state.generator.is_available().await,
        game_data_api: state.royale.is_some(),
    })
}
