use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::github::client::{DEFAULT_API_BASE, DEFAULT_PINNED_BASE};

const DEFAULT_DATA_DIR: &str = "./data";

/// Where history and preferences are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Redis(String),
    Files(PathBuf),
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub pinned_repos_url: String,
    pub storage: StorageBackend,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage = match optional_env("REDIS_URL") {
            Some(url) => StorageBackend::Redis(url),
            None => StorageBackend::Files(
                optional_env("DATA_DIR")
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                    .into(),
            ),
        };

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            github_api_url: optional_env("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            github_token: optional_env("GITHUB_TOKEN"),
            pinned_repos_url: optional_env("PINNED_REPOS_URL")
                .unwrap_or_else(|| DEFAULT_PINNED_BASE.to_string()),
            storage,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
