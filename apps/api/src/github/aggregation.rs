//! Profile aggregation: one profile request, then every repository page and the
//! pinned-repos scrape concurrently, joined into a single `ProfileBundle`.
//!
//! Failure policy is all-or-nothing: if the profile or any repository page fails,
//! the whole call fails with that error. Only the pinned-repos fetch is allowed to
//! degrade (to an empty list).

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::client::REPOS_PER_PAGE;
use super::{GitHubError, GitHubSource, PinnedRepository, Profile, Repository};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBundle {
    pub profile: Profile,
    /// Order carries no meaning; projections sort as needed.
    pub repos: Vec<Repository>,
    pub pinned_repos: Vec<PinnedRepository>,
}

/// Number of repository pages needed for `public_repos` repositories.
pub fn page_count(public_repos: u32) -> u32 {
    public_repos.div_ceil(REPOS_PER_PAGE)
}

pub async fn fetch_profile_bundle(
    github: &dyn GitHubSource,
    login: &str,
) -> Result<ProfileBundle, GitHubError> {
    let profile = github.profile(login).await?;

    let (repos, pinned_repos) = tokio::join!(
        fetch_all_repos(github, login, profile.public_repos),
        fetch_pinned_repos(github, login),
    );
    let repos = repos?;

    info!(
        "Fetched {} repositories and {} pinned repositories for {}",
        repos.len(),
        pinned_repos.len(),
        login
    );

    Ok(ProfileBundle {
        profile,
        repos,
        pinned_repos,
    })
}

async fn fetch_all_repos(
    github: &dyn GitHubSource,
    login: &str,
    public_repos: u32,
) -> Result<Vec<Repository>, GitHubError> {
    let pages = page_count(public_repos);
    if pages == 0 {
        return Ok(Vec::new());
    }

    let results = try_join_all((1..=pages).map(|page| github.repo_page(login, page))).await?;
    Ok(results.into_iter().flatten().collect())
}

async fn fetch_pinned_repos(github: &dyn GitHubSource, login: &str) -> Vec<PinnedRepository> {
    match github.pinned_repos(login).await {
        Ok(pinned) => pinned,
        Err(e) => {
            warn!("Failed to fetch pinned repos for {login}: {e}");
            Vec::new()
        }
    }
}
