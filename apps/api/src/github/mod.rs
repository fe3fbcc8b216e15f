// GitHub data source: REST client, pinned-repos scraper and the profile aggregation.
// Everything that talks to GitHub goes through the `GitHubSource` trait so the
// aggregation can be exercised without a network.

pub mod aggregation;
pub mod client;

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use aggregation::{fetch_profile_bundle, ProfileBundle};
pub use client::GitHubClient;

/// Snapshot of a GitHub account as returned by `GET /users/{login}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Display name, falling back to the login.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub language: Option<String>,
    pub license: Option<License>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry of a followers / following list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
}

/// Pinned repository as scraped by the third-party pinned-repos service.
/// Counts arrive as display strings ("1.2k"), not numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedRepository {
    pub owner: String,
    pub repo: String,
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub language_color: Option<String>,
    #[serde(default)]
    pub stars: String,
    #[serde(default)]
    pub forks: String,
}

pub const RATE_LIMIT_MESSAGE: &str =
    "GitHub API rate limit exceeded. Please wait a while before trying again.";
pub const SERVER_ERROR_MESSAGE: &str =
    "GitHub's servers are experiencing issues. Please try again later.";
pub const GENERIC_ERROR_MESSAGE: &str =
    "An unexpected error occurred while fetching from GitHub.";

/// Failure taxonomy of the GitHub collaborator. Display strings are user-facing.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub user \"{0}\" not found.")]
    NotFound(String),

    /// Refused locally; the login would not form a `/users/{login}` path.
    #[error("{}", INVALID_USERNAME)]
    InvalidLogin(String),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{}", SERVER_ERROR_MESSAGE)]
    ServerError { status: u16 },

    /// Any other non-success status; carries the remote `message` when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error while contacting GitHub: {0}")]
    Http(#[from] reqwest::Error),
}

impl GitHubError {
    /// Maps a non-success status and its body to exactly one error kind.
    pub fn from_status(status: u16, body: &str, login: &str) -> Self {
        match status {
            404 => GitHubError::NotFound(login.to_string()),
            403 => GitHubError::RateLimited,
            500 | 503 => GitHubError::ServerError { status },
            _ => {
                let message = serde_json::from_str::<ApiErrorBody>(body)
                    .ok()
                    .and_then(|b| b.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
                GitHubError::Api { status, message }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

pub const INVALID_USERNAME: &str = "Invalid GitHub username.";

fn re_login() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,38}$").unwrap())
}

/// GitHub login rule: alphanumeric first character, then up to 38 of
/// alphanumerics, `-` or `_`. Anything else never reaches a request path.
pub fn is_valid_login(login: &str) -> bool {
    re_login().is_match(login)
}

/// Everything the service needs from GitHub. `GitHubClient` is the production
/// implementation; tests substitute an in-memory fake.
#[async_trait]
pub trait GitHubSource: Send + Sync {
    async fn profile(&self, login: &str) -> Result<Profile, GitHubError>;

    /// One page (1-based) of `GET /users/{login}/repos`, 100 per page.
    async fn repo_page(&self, login: &str, page: u32) -> Result<Vec<Repository>, GitHubError>;

    /// Best-effort scrape. Callers degrade any error to an empty list.
    async fn pinned_repos(&self, login: &str) -> Result<Vec<PinnedRepository>, GitHubError>;

    async fn followers(&self, login: &str) -> Result<Vec<GithubUser>, GitHubError>;

    async fn following(&self, login: &str) -> Result<Vec<GithubUser>, GitHubError>;
}
