//! Game-data API client.
//!
//! Fetches the player profile (card pool) and the recent battle log from the
//! Clash Royale API or a compatible proxy.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::RoyaleApiConfig;
use crate::models::{RawBattle, RawPlayer};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid player tag: '{0}'")]
    InvalidTag(String),

    #[error("API token not configured (set {0})")]
    MissingToken(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Normalize a player tag to `#TAG` form.
///
/// Accepts tags with or without the leading `#`, in any case. Tags may only
/// contain ASCII letters and digits.
pub fn normalize_tag(tag: &str) -> Result<String, FetchError> {
    let clean = tag.trim();
    let clean = clean.strip_prefix('#').unwrap_or(clean);
    if clean.is_empty() || !clean.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FetchError::InvalidTag(tag.to_string()));
    }
    Ok(format!("#{}", clean.to_ascii_uppercase()))
}

/// Client for the game-data API.
pub struct RoyaleClient {
    client: Client,
    base_url: Url,
}

impl RoyaleClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("deck-advisor/0.1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| FetchError::MissingToken("a valid API token".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Build a client from configuration, reading the token from the
    /// configured environment variable.
    pub fn from_config(config: &RoyaleApiConfig) -> Result<Self, FetchError> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| FetchError::MissingToken(config.token_env.clone()))?;
        Self::new(
            &config.base_url,
            &token,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// `<base>/players/<%23TAG>[/<suffix>]`
    fn player_url(&self, tag: &str, suffix: Option<&str>) -> Result<Url, FetchError> {
        let tag = normalize_tag(tag)?;
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("players").push(&tag);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Raw player profile, as returned by the API.
    pub async fn fetch_player_json(&self, tag: &str) -> Result<serde_json::Value, FetchError> {
        let url = self.player_url(tag, None)?;
        info!("Fetching player {}", tag);
        self.get_json(url).await
    }

    pub async fn fetch_player(&self, tag: &str) -> Result<RawPlayer, FetchError> {
        Ok(serde_json::from_value(self.fetch_player_json(tag).await?)?)
    }

    /// Raw battle log, as returned by the API.
    pub async fn fetch_battle_log_json(&self, tag: &str) -> Result<serde_json::Value, FetchError> {
        let url = self.player_url(tag, Some("battlelog"))?;
        info!("Fetching battle log for {}", tag);
        self.get_json(url).await
    }

    pub async fn fetch_battle_log(&self, tag: &str) -> Result<Vec<RawBattle>, FetchError> {
        Ok(serde_json::from_value(self.fetch_battle_log_json(tag).await?)?)
    }
}
