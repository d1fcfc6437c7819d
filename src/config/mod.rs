//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Prefix of environment overrides, e.g. `DECK_ADVISOR__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "DECK_ADVISOR";

/// AI backends understood by [`AiConfig::backend`].
pub const AI_BACKENDS: [&str; 3] = ["ollama", "openai", "none"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load layered config: {0}")]
    LayerError(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Guidance generator backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Backend type: "ollama", "openai" (any OpenAI-compatible API such as
    /// Groq) or "none" for templated guidance only
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Base URL for the AI service; see [`AiConfig::endpoint`] when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key for remote backends
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_backend() -> String {
    "ollama".to_string()
}

const OLLAMA_BASE_URL: &str = "http://localhost:11434";
const OPENAI_COMPATIBLE_BASE_URL: &str = "https://api.groq.com/openai/v1";

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_ai_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_ai_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AiConfig {
    /// The configured base URL, or the default for the selected backend.
    pub fn endpoint(&self) -> &str {
        match (&self.base_url, self.backend.as_str()) {
            (Some(url), _) => url,
            (None, "openai") => OPENAI_COMPATIBLE_BASE_URL,
            (None, _) => OLLAMA_BASE_URL,
        }
    }
}

/// Game-data API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoyaleApiConfig {
    #[serde(default = "default_royale_base_url")]
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_royale_timeout")]
    pub timeout_seconds: u64,
}

fn default_royale_base_url() -> String {
    "https://proxy.royaleapi.dev/v1".to_string()
}

fn default_token_env() -> String {
    "CLASH_ROYALE_API_TOKEN".to_string()
}

fn default_royale_timeout() -> u64 {
    15
}

impl Default for RoyaleApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_royale_base_url(),
            token_env: default_token_env(),
            timeout_seconds: default_royale_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub royale_api: RoyaleApiConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            ai: AiConfig::default(),
            server: ServerConfig::default(),
            royale_api: RoyaleApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, then the optional file, then `DECK_ADVISOR__*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !AI_BACKENDS.contains(&self.ai.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unknown AI backend '{}', expected one of {:?}",
                self.ai.backend, AI_BACKENDS
            )));
        }

        if self.ai.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "AI timeout must be greater than 0".to_string(),
            ));
        }

        if self.royale_api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Game-data API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.ai.backend, "ollama");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.royale_api.base_url, "https://proxy.royaleapi.dev/v1");
        assert_eq!(config.royale_api.token_env, "CLASH_ROYALE_API_TOKEN");
    }

    #[test]
    fn test_ai_config_default() {
        let ai = AiConfig::default();

        assert_eq!(ai.backend, "ollama");
        assert_eq!(ai.base_url, None);
        assert_eq!(ai.endpoint(), "http://localhost:11434");
        assert_eq!(ai.model, "llama3.2");
        assert_eq!(ai.api_key_env, "GROQ_API_KEY");
        assert_eq!(ai.max_tokens, 2000);
    }

    #[test]
    fn test_ai_endpoint_follows_backend() {
        let ai = AiConfig {
            backend: "openai".to_string(),
            ..Default::default()
        };
        assert_eq!(ai.endpoint(), "https://api.groq.com/openai/v1");

        let ai = AiConfig {
            backend: "openai".to_string(),
            base_url: Some("http://localhost:8000/v1".to_string()),
            ..Default::default()
        };
        assert_eq!(ai.endpoint(), "http://localhost:8000/v1");
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.ai.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.royale_api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_backend() {
        let mut config = AppConfig::default();
        config.ai.backend = "anthropic".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("anthropic"));
    }

    #[test]
    fn test_from_file_partial() {
        let file = write_config(
            r#"
log_level = "debug"

[ai]
backend = "openai"
base_url = "https://api.groq.com/openai/v1"
model = "llama-3.1-8b-instant"

[server]
port = 9000
"#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.ai.backend, "openai");
        assert_eq!(config.ai.model, "llama-3.1-8b-instant");
        assert_eq!(config.ai.endpoint(), "https://api.groq.com/openai/v1");
        // Unset fields keep their defaults
        assert_eq!(config.ai.temperature, 0.7);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let file = write_config("[server]\nport = 0\n");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));

        let file = write_config("log_level = [");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_layers_file_over_defaults() {
        let file = write_config("[ai]\nbackend = \"none\"\n");
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.ai.backend, "none");
        assert_eq!(config.ai.model, "llama3.2");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.royale_api.base_url, parsed.royale_api.base_url);
        assert_eq!(config.ai.max_tokens, parsed.ai.max_tokens);
    }
}
