//! Resume analysis result and the resolution of a GitHub login from it.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const NO_GITHUB_LINK: &str = "Could not find a GitHub profile link in the resume.";
pub const INVALID_GITHUB_LINK: &str =
    "Found a link, but it does not appear to be a valid GitHub profile URL.";

/// Categorized links extracted from a resume by the AI.
/// Field names follow the structured-output schema the model is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisResult {
    #[serde(default)]
    pub github_profile_url: Option<String>,
    #[serde(default)]
    pub linked_in_url: Option<String>,
    #[serde(default)]
    pub portfolio_urls: Vec<String>,
    #[serde(default)]
    pub project_urls: Vec<String>,
    #[serde(default)]
    pub other_urls: Vec<String>,
}

/// Everything in the analysis except the GitHub link; kept for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedUrls {
    pub linked_in_url: Option<String>,
    pub portfolio_urls: Vec<String>,
    pub project_urls: Vec<String>,
    pub other_urls: Vec<String>,
}

impl ResumeAnalysisResult {
    /// Trims every URL, turns blank singles into `None`, drops blank entries and
    /// removes duplicates across and within categories (first occurrence wins,
    /// in schema field order).
    pub fn normalized(self) -> Self {
        let mut seen = HashSet::new();
        let mut keep_single = |url: Option<String>| {
            url.map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty() && seen.insert(u.clone()))
        };
        let github_profile_url = keep_single(self.github_profile_url);
        let linked_in_url = keep_single(self.linked_in_url);

        let mut keep_all = |urls: Vec<String>| -> Vec<String> {
            urls.into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty() && seen.insert(u.clone()))
                .collect()
        };
        let portfolio_urls = keep_all(self.portfolio_urls);
        let project_urls = keep_all(self.project_urls);
        let other_urls = keep_all(self.other_urls);

        Self {
            github_profile_url,
            linked_in_url,
            portfolio_urls,
            project_urls,
            other_urls,
        }
    }

    pub fn categorized_urls(&self) -> CategorizedUrls {
        CategorizedUrls {
            linked_in_url: self.linked_in_url.clone(),
            portfolio_urls: self.portfolio_urls.clone(),
            project_urls: self.project_urls.clone(),
            other_urls: self.other_urls.clone(),
        }
    }
}

fn re_github_profile() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://(www\.)?github\.com/([A-Za-z0-9_-]+)/?").unwrap())
}

/// Derives the GitHub login from the analysis. Any trailing path after the login
/// segment (e.g. a repository name) is ignored.
pub fn resolve_username(result: &ResumeAnalysisResult) -> Result<String, AppError> {
    let url = result
        .github_profile_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::UnprocessableEntity(NO_GITHUB_LINK.to_string()))?;

    re_github_profile()
        .captures(url)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AppError::UnprocessableEntity(INVALID_GITHUB_LINK.to_string()))
}
