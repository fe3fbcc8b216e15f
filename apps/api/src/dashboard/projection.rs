//! Repository projections. Every function here is a pure function of the
//! repository set and the filter parameters; nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::github::Repository;

/// Sentinel language filter that matches every repository.
pub const ALL_LANGUAGES: &str = "All";
/// Size of the "top repositories" card and of the stars chart.
pub const TOP_REPO_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Stars,
    Forks,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFilter {
    pub query: String,
    pub language: String,
    pub sort: SortKey,
}

impl Default for RepoFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            language: ALL_LANGUAGES.to_string(),
            sort: SortKey::default(),
        }
    }
}

impl RepoFilter {
    pub fn matches(&self, repo: &Repository) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_query = query.is_empty()
            || repo.name.to_lowercase().contains(&query)
            || repo
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query));

        let matches_language = self.language == ALL_LANGUAGES
            || repo.language.as_deref() == Some(self.language.as_str());

        matches_query && matches_language
    }
}

/// Filters then sorts descending by the chosen key. The sort is stable: ties keep
/// the order of the input slice.
pub fn filter_and_sort(repos: &[Repository], filter: &RepoFilter) -> Vec<Repository> {
    let mut selected: Vec<Repository> = repos.iter().filter(|r| filter.matches(r)).cloned().collect();
    sort_desc(&mut selected, filter.sort);
    selected
}

pub fn sort_desc(repos: &mut [Repository], key: SortKey) {
    match key {
        SortKey::Stars => repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        SortKey::Forks => repos.sort_by(|a, b| b.forks_count.cmp(&a.forks_count)),
        SortKey::Updated => repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
}

/// The `n` most-starred repositories.
pub fn top_by_stars(repos: &[Repository], n: usize) -> Vec<&Repository> {
    let mut sorted: Vec<&Repository> = repos.iter().collect();
    sorted.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    sorted.truncate(n);
    sorted
}

/// The `n` most recently updated repositories.
pub fn most_recently_updated(repos: &[Repository], n: usize) -> Vec<&Repository> {
    let mut sorted: Vec<&Repository> = repos.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.truncate(n);
    sorted
}

/// `All` followed by every distinct language, alphabetically.
pub fn language_options(repos: &[Repository]) -> Vec<String> {
    let distinct: BTreeSet<&str> = repos.iter().filter_map(|r| r.language.as_deref()).collect();
    std::iter::once(ALL_LANGUAGES.to_string())
        .chain(distinct.into_iter().map(String::from))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub name: String,
    pub count: u32,
}

/// Repositories per language, most used first; ties ordered by name.
/// Repositories without a language are not counted.
pub fn language_histogram(repos: &[Repository]) -> Vec<LanguageCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        *counts.entry(language).or_default() += 1;
    }

    let mut histogram: Vec<LanguageCount> = counts
        .into_iter()
        .map(|(name, count)| LanguageCount {
            name: name.to_string(),
            count,
        })
        .collect();
    histogram.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    histogram
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStat {
    pub name: String,
    pub stars: u32,
    pub forks: u32,
}

pub fn star_ranking(repos: &[Repository], n: usize) -> Vec<RepoStat> {
    top_by_stars(repos, n)
        .into_iter()
        .map(|r| RepoStat {
            name: r.name.clone(),
            stars: r.stargazers_count,
            forks: r.forks_count,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u32,
}

/// Repositories created per year, with empty years between the first and last
/// filled with zero. Fewer than two distinct years yields an empty timeline.
pub fn activity_timeline(repos: &[Repository]) -> Vec<YearCount> {
    let mut per_year: BTreeMap<i32, u32> = BTreeMap::new();
    for repo in repos {
        *per_year.entry(repo.created_at.year()).or_default() += 1;
    }

    let (Some((&first, _)), Some((&last, _))) =
        (per_year.first_key_value(), per_year.last_key_value())
    else {
        return Vec::new();
    };
    if per_year.len() < 2 {
        return Vec::new();
    }

    (first..=last)
        .map(|year| YearCount {
            year,
            count: per_year.get(&year).copied().unwrap_or(0),
        })
        .collect()
}

/// Whole days since the most recent repository update, or `None` without repositories.
pub fn days_since_last_update(repos: &[Repository], now: DateTime<Utc>) -> Option<i64> {
    repos
        .iter()
        .map(|r| r.updated_at)
        .max()
        .map(|last| (now - last).num_days().max(0))
}

/// "Today", "12d ago", or "N/A".
pub fn last_activity_label(repos: &[Repository], now: DateTime<Utc>) -> String {
    match days_since_last_update(repos, now) {
        Some(0) => "Today".to_string(),
        Some(days) => format!("{days}d ago"),
        None => "N/A".to_string(),
    }
}
