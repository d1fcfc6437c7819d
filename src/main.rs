use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deck_advisor::agents::backend::create_backend;
use deck_advisor::agents::{CoachAgent, DisabledGenerator, GuidanceGenerator};
use deck_advisor::api::{build_router, state::AppState};
use deck_advisor::calculate::analyze;
use deck_advisor::catalog::parse_player_cards;
use deck_advisor::compose::Policy;
use deck_advisor::config::{AiConfig, AppConfig};
use deck_advisor::engine::{
    advise, compose_all_policies, compose_all_policies_with_history, compose_deck,
    compose_with_history,
};
use deck_advisor::fetch::RoyaleClient;
use deck_advisor::models::{MatchRecord, RawBattle, RawPlayer};

#[derive(Parser)]
#[command(name = "deck-advisor")]
#[command(about = "Deck builder and match-history coach")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compose decks from a saved player payload or a live player tag
    Compose {
        /// Player profile JSON
        #[arg(long, required_unless_present = "tag")]
        player: Option<PathBuf>,

        /// Fetch the profile (and the battle log, unless given) from the game-data API
        #[arg(long, conflicts_with = "player")]
        tag: Option<String>,

        /// Policy to use; all policies when omitted
        #[arg(long)]
        policy: Option<String>,

        /// Battle log JSON to optimize against
        #[arg(long)]
        battle_log: Option<PathBuf>,

        /// Also produce coaching guidance
        #[arg(long)]
        guidance: bool,
    },

    /// Analyze a saved battle log
    Analyze {
        /// Battle log JSON
        #[arg(long)]
        battle_log: PathBuf,

        /// Player profile JSON, used to report unused cards
        #[arg(long)]
        player: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting deck-advisor v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let royale = match RoyaleClient::from_config(&config.royale_api) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("Game-data API disabled: {}", e);
                    None
                }
            };
            let generator = build_generator(&config.ai);
            if generator.name() != DisabledGenerator.name() && !generator.is_available().await {
                tracing::warn!(
                    "Guidance generator '{}' is not reachable; responses will use templated guidance until it is",
                    generator.name()
                );
            }
            let state = AppState::new(generator, royale)
                .with_cors_origin(config.server.cors_origin.clone());

            let app = build_router(state);
            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Compose {
            player,
            tag,
            policy,
            battle_log,
            guidance,
        } => {
            let client = match &tag {
                Some(_) => Some(RoyaleClient::from_config(&config.royale_api)?),
                None => None,
            };
            let raw: RawPlayer = match (&client, &tag, &player) {
                (Some(client), Some(tag), _) => client.fetch_player(tag).await?,
                (_, _, Some(path)) => read_json(path)?,
                _ => anyhow::bail!("Either --player or --tag is required"),
            };
            let pool = parse_player_cards(&raw)?;
            let policy = policy.map(|p| p.parse::<Policy>()).transpose()?;
            let history = match (battle_log, &client, &tag) {
                (Some(path), _, _) => {
                    MatchRecord::from_battle_log(&read_json::<Vec<RawBattle>>(&path)?)
                }
                (None, Some(client), Some(tag)) => {
                    MatchRecord::from_battle_log(&client.fetch_battle_log(tag).await?)
                }
                _ => Vec::new(),
            };
            tracing::info!(
                "Loaded {} cards and {} battles",
                pool.len(),
                history.len()
            );

            if guidance {
                let generator = build_generator(&config.ai);
                let advice = advise(
                    &pool,
                    &history,
                    policy.unwrap_or_default(),
                    generator.as_ref(),
                )
                .await;
                print_json(&advice)?;
            } else if !history.is_empty() {
                match policy {
                    Some(policy) => print_json(&compose_with_history(&pool, &history, policy))?,
                    None => print_json(&compose_all_policies_with_history(&pool, &history))?,
                }
            } else if let Some(policy) = policy {
                print_json(&compose_deck(&pool, policy))?;
            } else {
                print_json(&compose_all_policies(&pool))?;
            }
        }
        Commands::Analyze { battle_log, player } => {
            let history = MatchRecord::from_battle_log(&read_json::<Vec<RawBattle>>(&battle_log)?);
            let owned = match player {
                Some(path) => parse_player_cards(&read_json::<RawPlayer>(&path)?)?.names(),
                None => Vec::new(),
            };
            print_json(&analyze(&history, &owned))?;
        }
    }

    Ok(())
}

/// Guidance generator for the configured AI backend, or templated guidance
/// only when none is usable.
fn build_generator(config: &AiConfig) -> Arc<dyn GuidanceGenerator> {
    match create_backend(config) {
        Ok(Some(backend)) => {
            tracing::info!("Using {} backend with model {}", backend.name(), config.model);
            Arc::new(
                CoachAgent::new(Arc::from(backend))
                    .with_sampling(config.temperature, config.max_tokens),
            )
        }
        Ok(None) => Arc::new(DisabledGenerator),
        Err(e) => {
            tracing::warn!("AI backend unavailable, using templated guidance: {}", e);
            Arc::new(DisabledGenerator)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
