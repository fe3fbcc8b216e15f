use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    is_valid_login, GitHubError, GitHubSource, GithubUser, PinnedRepository, Profile, Repository,
};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_PINNED_BASE: &str = "https://gh-pinned-repos.egoist.dev";
pub const REPOS_PER_PAGE: u32 = 100;
const USER_AGENT: &str = concat!("gitprofile/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// `/users/{login}{rest}` with the login checked and percent-encoded as a single segment.
fn users_endpoint(login: &str, rest: &str) -> Result<String, GitHubError> {
    if !is_valid_login(login) {
        return Err(GitHubError::InvalidLogin(login.to_string()));
    }
    Ok(format!("/users/{}{rest}", urlencoding::encode(login)))
}

/// REST client for the public GitHub API plus the unofficial pinned-repos service.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    pinned_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_base: &str, pinned_base: &str, token: Option<String>) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            pinned_base: pinned_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        login: &str,
    ) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.api_base, endpoint);
        debug!("GET {url}");

        let mut request = self.client.get(&url).header("Accept", GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GitHub returned {} for {}", status, endpoint);
            return Err(GitHubError::from_status(status.as_u16(), &body, login));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GitHubSource for GitHubClient {
    async fn profile(&self, login: &str) -> Result<Profile, GitHubError> {
        self.get_json(&users_endpoint(login, "")?, login).await
    }

    async fn repo_page(&self, login: &str, page: u32) -> Result<Vec<Repository>, GitHubError> {
        let rest = format!("/repos?sort=updated&per_page={REPOS_PER_PAGE}&page={page}");
        self.get_json(&users_endpoint(login, &rest)?, login).await
    }

    async fn pinned_repos(&self, login: &str) -> Result<Vec<PinnedRepository>, GitHubError> {
        let response = self
            .client
            .get(format!("{}/", self.pinned_base))
            .query(&[("username", login)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: format!("pinned repos service returned {status}"),
            });
        }

        Ok(response.json().await?)
    }

    async fn followers(&self, login: &str) -> Result<Vec<GithubUser>, GitHubError> {
        self.get_json(&users_endpoint(login, "/followers?per_page=100")?, login)
            .await
    }

    async fn following(&self, login: &str) -> Result<Vec<GithubUser>, GitHubError> {
        self.get_json(&users_endpoint(login, "/following?per_page=100")?, login)
            .await
    }
}
