mod analyst;
mod config;
mod dashboard;
mod errors;
mod github;
mod llm_client;
mod resume;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyst::ClaudeAnalyst;
use crate::config::{Config, StorageBackend};
use crate::dashboard::sessions::{SESSION_IDLE_TTL, SESSION_SWEEP_INTERVAL};
use crate::dashboard::SessionStore;
use crate::github::GitHubClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStore, HistoryStore, KeyValueStore, PreferenceStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GitProfile API v{}", env!("CARGO_PKG_VERSION"));

    // Persisted state: Redis when configured, JSON files otherwise
    let store: Arc<dyn KeyValueStore> = match &config.storage {
        StorageBackend::Redis(url) => {
            info!("Persisting history and preferences in Redis");
            Arc::new(RedisStore::open(url)?)
        }
        StorageBackend::Files(dir) => {
            info!("Persisting history and preferences under {}", dir.display());
            Arc::new(FileStore::new(dir.clone()))
        }
    };

    let github = GitHubClient::new(
        &config.github_api_url,
        &config.pinned_repos_url,
        config.github_token.clone(),
    )?;
    info!(
        "GitHub client initialized (authenticated: {})",
        config.github_token.is_some()
    );

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let sessions = Arc::new(SessionStore::new());
    sessions
        .clone()
        .spawn_sweeper(SESSION_IDLE_TTL, SESSION_SWEEP_INTERVAL);

    let state = AppState {
        github: Arc::new(github),
        analyst: Arc::new(ClaudeAnalyst::new(llm)),
        history: Arc::new(HistoryStore::new(store.clone())),
        preferences: Arc::new(PreferenceStore::new(store)),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
