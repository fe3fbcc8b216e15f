//! Builds the prompts and grounding documents sent with each analysis call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyst::insights::INSIGHT_CATEGORIES;
use crate::analyst::prompts::{
    INSIGHTS_PROMPT_TEMPLATE, PROFILE_CHAT_SYSTEM_TEMPLATE, SUMMARY_PROMPT_TEMPLATE,
};
use crate::dashboard::projection::{most_recently_updated, top_by_stars};
use crate::github::{Profile, Repository};
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, MARKDOWN_INSTRUCTION};

pub const SUMMARY_TOP_REPOS: usize = 10;
pub const INSIGHTS_REPO_SAMPLE: usize = 20;
pub const CHAT_TOP_REPOS: usize = 15;

const DAYS_PER_YEAR: f64 = 365.0;

pub fn summary_prompt(profile: &Profile, repos: &[Repository]) -> String {
    let top_repos = top_by_stars(repos, SUMMARY_TOP_REPOS)
        .into_iter()
        .map(|r| {
            format!(
                "- **{}** (Lang: {}, Stars: {}): {}",
                r.name,
                r.language.as_deref().unwrap_or("N/A"),
                r.stargazers_count,
                r.description.as_deref().unwrap_or("No description.")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let top_repos = if top_repos.is_empty() {
        "No public repositories to analyze.".to_string()
    } else {
        top_repos
    };

    SUMMARY_PROMPT_TEMPLATE
        .replace("{name}", profile.display_name())
        .replace("{login}", &profile.login)
        .replace("{bio}", profile.bio.as_deref().unwrap_or("Not provided."))
        .replace("{followers}", &profile.followers.to_string())
        .replace("{public_repos}", &profile.public_repos.to_string())
        .replace(
            "{location}",
            profile.location.as_deref().unwrap_or("Not specified"),
        )
        .replace("{top_repos}", &top_repos)
}

/// Account age in years, one decimal place.
pub fn account_age_years(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days().max(0) as f64;
    format!("{:.1}", days / DAYS_PER_YEAR)
}

#[derive(Debug, Serialize)]
struct RepoSample<'a> {
    name: &'a str,
    stars: u32,
    forks: u32,
    language: Option<&'a str>,
    description: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

pub fn insights_prompt(profile: &Profile, repos: &[Repository], now: DateTime<Utc>) -> String {
    let sample: Vec<RepoSample> = most_recently_updated(repos, INSIGHTS_REPO_SAMPLE)
        .into_iter()
        .map(|r| RepoSample {
            name: &r.name,
            stars: r.stargazers_count,
            forks: r.forks_count,
            language: r.language.as_deref(),
            description: r.description.as_deref(),
            updated_at: r.updated_at,
        })
        .collect();
    let sample_json = serde_json::to_string_pretty(&sample).unwrap_or_else(|_| "[]".to_string());

    INSIGHTS_PROMPT_TEMPLATE
        .replace("{categories}", &INSIGHT_CATEGORIES.join(", "))
        .replace("{followers}", &profile.followers.to_string())
        .replace("{public_repos}", &profile.public_repos.to_string())
        .replace("{bio}", profile.bio.as_deref().unwrap_or("Not provided."))
        .replace(
            "{account_age_years}",
            &account_age_years(profile.created_at, now),
        )
        .replace("{repo_sample}", &sample_json)
}

#[derive(Debug, Serialize)]
struct ChatRepo<'a> {
    name: &'a str,
    language: Option<&'a str>,
    stars: u32,
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatContext<'a> {
    name: Option<&'a str>,
    login: &'a str,
    bio: Option<&'a str>,
    followers: u32,
    public_repos: u32,
    top_repositories: Vec<ChatRepo<'a>>,
}

/// System prompt for a profile-grounded chat. The JSON context is frozen into the
/// prompt; later changes to the dashboard never reach an existing chat.
pub fn profile_chat_system(profile: &Profile, repos: &[Repository]) -> String {
    let context = ChatContext {
        name: profile.name.as_deref(),
        login: &profile.login,
        bio: profile.bio.as_deref(),
        followers: profile.followers,
        public_repos: profile.public_repos,
        top_repositories: top_by_stars(repos, CHAT_TOP_REPOS)
            .into_iter()
            .map(|r| ChatRepo {
                name: &r.name,
                language: r.language.as_deref(),
                stars: r.stargazers_count,
                description: r.description.as_deref(),
            })
            .collect(),
    };
    let context_json = serde_json::to_string_pretty(&context).unwrap_or_else(|_| "{}".to_string());

    PROFILE_CHAT_SYSTEM_TEMPLATE
        .replace("{name}", profile.display_name())
        .replace("{grounding}", GROUNDING_INSTRUCTION)
        .replace("{formatting}", MARKDOWN_INSTRUCTION)
        .replace("{context}", &context_json)
}
