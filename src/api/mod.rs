//! REST API endpoints.
//!
//! Axum-based HTTP API exposing deck composition, match-history analysis
//! and a proxy to the game-data API.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::catalog::CatalogError;
use crate::fetch::FetchError;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidTag(_) => ApiError::BadRequest(e.to_string()),
            FetchError::HttpStatus { status: 404, .. } => {
                ApiError::NotFound("Player not found".to_string())
            }
            FetchError::MissingToken(_) => ApiError::Unavailable(e.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// CORS layer for the configured origin; `*` allows any origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/player", get(routes::player::player))
        .route("/api/battlelog/:tag", get(routes::player::battle_log))
        .route("/api/decks", post(routes::decks::create_decks))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mapping() {
        let err: ApiError = FetchError::InvalidTag("??".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = FetchError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = FetchError::HttpStatus {
            status: 503,
            message: "Service Unavailable".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Upstream(_)));

        let err: ApiError = FetchError::MissingToken("TOKEN".to_string()).into();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::Upstream("boom".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::BadRequest("bad".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
