//! Fixtures and in-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::analyst::insights::{InsightItem, InsightsData};
use crate::analyst::ProfileAnalyst;
use crate::errors::AppError;
use crate::github::client::REPOS_PER_PAGE;
use crate::github::{
    GitHubError, GitHubSource, GithubUser, PinnedRepository, Profile, Repository,
};
use crate::llm_client::Message;
use crate::resume::{ResumeAnalysisResult, ResumeContent};
use crate::dashboard::SessionStore;
use crate::state::AppState;
use crate::storage::{HistoryStore, KeyValueStore, PreferenceStore};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2011, 1, 25, 18, 44, 36).unwrap()
}

pub fn profile_fixture(login: &str, public_repos: u32) -> Profile {
    Profile {
        login: login.to_string(),
        id: 583231,
        avatar_url: format!("https://avatars.githubusercontent.com/{login}"),
        html_url: format!("https://github.com/{login}"),
        name: None,
        company: None,
        blog: None,
        location: None,
        bio: None,
        public_repos,
        followers: 42,
        following: 7,
        created_at: fixed_time(),
    }
}

pub fn repo_fixture(
    id: u64,
    name: &str,
    description: Option<&str>,
    language: Option<&str>,
    stars: u32,
    forks: u32,
) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        html_url: format!("https://github.com/octocat/{name}"),
        description: description.map(str::to_string),
        stargazers_count: stars,
        forks_count: forks,
        language: language.map(str::to_string),
        license: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn repo_fixture_dated(
    id: u64,
    name: &str,
    stars: u32,
    forks: u32,
    created_year: i32,
    updated_year: i32,
) -> Repository {
    let mut repo = repo_fixture(id, name, None, None, stars, forks);
    repo.created_at = Utc.with_ymd_and_hms(created_year, 3, 1, 12, 0, 0).unwrap();
    repo.updated_at = Utc.with_ymd_and_hms(updated_year, 6, 1, 12, 0, 0).unwrap();
    repo
}

pub fn user_fixture(login: &str) -> GithubUser {
    GithubUser {
        login: login.to_string(),
        id: 1,
        avatar_url: format!("https://avatars.githubusercontent.com/{login}"),
        html_url: format!("https://github.com/{login}"),
    }
}

pub fn pinned_fixture(owner: &str, repo: &str) -> PinnedRepository {
    PinnedRepository {
        owner: owner.to_string(),
        repo: repo.to_string(),
        link: format!("https://github.com/{owner}/{repo}"),
        description: None,
        image: None,
        website: None,
        language: Some("Rust".into()),
        language_color: Some("#dea584".into()),
        stars: "1.2k".into(),
        forks: "40".into(),
    }
}

#[derive(Debug, Clone)]
pub enum PinnedBehaviour {
    Repos(Vec<PinnedRepository>),
    Status(u16),
}

/// In-memory GitHub. Unknown logins answer 404, repositories are paged by 100.
pub struct FakeGitHub {
    users: HashMap<String, (Profile, Vec<Repository>)>,
    pinned: PinnedBehaviour,
    failing_pages: HashMap<u32, u16>,
    connections_status: Option<u16>,
    pages: Mutex<Vec<u32>>,
    calls: AtomicUsize,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            pinned: PinnedBehaviour::Repos(Vec::new()),
            failing_pages: HashMap::new(),
            connections_status: None,
            pages: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_user(mut self, profile: Profile, repos: Vec<Repository>) -> Self {
        self.users
            .insert(profile.login.to_lowercase(), (profile, repos));
        self
    }

    pub fn with_pinned(mut self, pinned: PinnedBehaviour) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn failing_page(mut self, page: u32, status: u16) -> Self {
        self.failing_pages.insert(page, status);
        self
    }

    /// Followers and following both answer with `status`.
    pub fn failing_connections(mut self, status: u16) -> Self {
        self.connections_status = Some(status);
        self
    }

    fn connections(&self, login: &str) -> Result<(), GitHubError> {
        self.user(login)?;
        match self.connections_status {
            Some(status) => Err(GitHubError::from_status(status, "", login)),
            None => Ok(()),
        }
    }

    pub fn repo_page_calls(&self) -> usize {
        self.pages.lock().unwrap().len()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        let mut pages = self.pages.lock().unwrap().clone();
        pages.sort_unstable();
        pages
    }

    /// Every request of any kind.
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn user(&self, login: &str) -> Result<&(Profile, Vec<Repository>), GitHubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(&login.to_lowercase())
            .ok_or_else(|| GitHubError::NotFound(login.to_string()))
    }
}

#[async_trait]
impl GitHubSource for FakeGitHub {
    async fn profile(&self, login: &str) -> Result<Profile, GitHubError> {
        self.user(login).map(|(profile, _)| profile.clone())
    }

    async fn repo_page(&self, login: &str, page: u32) -> Result<Vec<Repository>, GitHubError> {
        self.pages.lock().unwrap().push(page);
        let (_, repos) = self.user(login)?;
        if let Some(status) = self.failing_pages.get(&page) {
            return Err(GitHubError::from_status(*status, "", login));
        }
        let per_page = REPOS_PER_PAGE as usize;
        Ok(repos
            .iter()
            .skip((page as usize - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn pinned_repos(&self, login: &str) -> Result<Vec<PinnedRepository>, GitHubError> {
        self.user(login)?;
        match &self.pinned {
            PinnedBehaviour::Repos(repos) => Ok(repos.clone()),
            PinnedBehaviour::Status(status) => Err(GitHubError::from_status(*status, "", login)),
        }
    }

    async fn followers(&self, login: &str) -> Result<Vec<GithubUser>, GitHubError> {
        self.connections(login)?;
        Ok(vec![user_fixture("follower-one"), user_fixture("follower-two")])
    }

    async fn following(&self, login: &str) -> Result<Vec<GithubUser>, GitHubError> {
        self.connections(login)?;
        Ok(vec![user_fixture("followed-one")])
    }
}

pub fn insights_fixture() -> InsightsData {
    InsightsData {
        overall_score: 74,
        insights: vec![InsightItem {
            name: "Open Source Contributor".into(),
            score: 81,
            justification: "Frequent public activity.".into(),
        }],
    }
}

/// Scripted analyst. Each operation answers with its configured outcome and
/// counts its calls.
pub struct FakeAnalyst {
    resume: Result<ResumeAnalysisResult, String>,
    summary: Result<String, String>,
    insights: Result<InsightsData, String>,
    chat_reply: Result<String, String>,
    resume_calls: AtomicUsize,
    summary_calls: AtomicUsize,
    insights_calls: AtomicUsize,
    chat_requests: Mutex<Vec<Vec<Message>>>,
}

impl FakeAnalyst {
    pub fn new() -> Self {
        Self {
            resume: Ok(ResumeAnalysisResult::default()),
            summary: Ok("A prolific developer.".into()),
            insights: Ok(insights_fixture()),
            chat_reply: Ok("Happy to help.".into()),
            resume_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            insights_calls: AtomicUsize::new(0),
            chat_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_resume_result(mut self, result: ResumeAnalysisResult) -> Self {
        self.resume = Ok(result);
        self
    }

    /// Resume result with only the GitHub profile link set.
    pub fn with_github_url(self, url: &str) -> Self {
        self.with_resume_result(ResumeAnalysisResult {
            github_profile_url: Some(url.to_string()),
            ..Default::default()
        })
    }

    pub fn failing_resume(mut self) -> Self {
        self.resume = Err("resume analysis unavailable".into());
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Ok(summary.to_string());
        self
    }

    pub fn failing_summary(mut self) -> Self {
        self.summary = Err("summary unavailable".into());
        self
    }

    pub fn failing_insights(mut self) -> Self {
        self.insights = Err("insights unavailable".into());
        self
    }

    pub fn with_chat_reply(mut self, reply: &str) -> Self {
        self.chat_reply = Ok(reply.to_string());
        self
    }

    pub fn failing_chat(mut self) -> Self {
        self.chat_reply = Err("chat unavailable".into());
        self
    }

    pub fn resume_calls(&self) -> usize {
        self.resume_calls.load(Ordering::SeqCst)
    }

    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }

    pub fn insights_calls(&self) -> usize {
        self.insights_calls.load(Ordering::SeqCst)
    }

    pub fn chat_requests(&self) -> Vec<Vec<Message>> {
        self.chat_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileAnalyst for FakeAnalyst {
    async fn extract_resume_links(
        &self,
        _resume: &ResumeContent,
    ) -> Result<ResumeAnalysisResult, AppError> {
        self.resume_calls.fetch_add(1, Ordering::SeqCst);
        self.resume
            .clone()
            .map(ResumeAnalysisResult::normalized)
            .map_err(AppError::Llm)
    }

    async fn summarize(&self, _profile: &Profile, _repos: &[Repository]) -> Result<String, AppError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.summary.clone().map_err(AppError::Llm)
    }

    async fn score_insights(
        &self,
        _profile: &Profile,
        _repos: &[Repository],
        _now: DateTime<Utc>,
    ) -> Result<InsightsData, AppError> {
        self.insights_calls.fetch_add(1, Ordering::SeqCst);
        self.insights.clone().map_err(AppError::Llm)
    }

    async fn chat(&self, _system: &str, conversation: &[Message]) -> Result<String, AppError> {
        self.chat_requests.lock().unwrap().push(conversation.to_vec());
        self.chat_reply.clone().map_err(AppError::Llm)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A store whose backend is always unavailable.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("store unavailable")
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable")
    }

    async fn delete(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("store unavailable")
    }
}

/// App state wired to the given fakes and an in-memory store. The fakes are
/// handed back so tests can inspect their call counts.
pub fn test_state(
    github: FakeGitHub,
    analyst: FakeAnalyst,
) -> (AppState, Arc<FakeGitHub>, Arc<FakeAnalyst>) {
    let github = Arc::new(github);
    let analyst = Arc::new(analyst);
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
    let state = AppState {
        github: github.clone(),
        analyst: analyst.clone(),
        history: Arc::new(HistoryStore::new(store.clone())),
        preferences: Arc::new(PreferenceStore::new(store)),
        sessions: Arc::new(SessionStore::new()),
    };
    (state, github, analyst)
}
