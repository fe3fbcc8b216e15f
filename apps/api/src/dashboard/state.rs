//! The dashboard view state and its reducer.
//!
//! A session's state is one `ViewState` value. Every user action and every
//! network result is an `Event`, applied through `reduce`. Analyses are tagged
//! with a ticket when they start; results carrying any other ticket are stale
//! and leave the state untouched.

use std::sync::Arc;

use serde::Serialize;

use crate::analyst::{ChatEntry, InsightsData};
use crate::dashboard::projection::{
    filter_and_sort, language_options, RepoFilter, TOP_REPO_COUNT,
};
use crate::github::{PinnedRepository, Profile, ProfileBundle, Repository};
use crate::resume::CategorizedUrls;

pub type Ticket = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Landing,
    Input,
    Processing,
    Success,
    Error,
}

/// A generated value and the login it was generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub login: String,
    pub value: T,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub phase: Phase,
    pub error: Option<String>,
    pub bundle: Option<Arc<ProfileBundle>>,
    pub urls: Option<CategorizedUrls>,
    pub filter: RepoFilter,
    /// Ticket of the analysis in flight.
    pub pending: Option<Ticket>,
    next_ticket: Ticket,
    /// Login being reloaded from the history list, if any.
    pub loading_history_login: Option<String>,
    pub summary: Option<Cached<String>>,
    pub insights: Option<Cached<InsightsData>>,
}

#[derive(Debug, Clone)]
pub enum Event {
    GetStarted,
    /// Input failed validation before any network call.
    InputRejected(String),
    AnalysisStarted {
        history_login: Option<String>,
    },
    ResumeAnalysed {
        ticket: Ticket,
        urls: CategorizedUrls,
    },
    ProfileLoaded {
        ticket: Ticket,
        bundle: Arc<ProfileBundle>,
    },
    Failed {
        ticket: Ticket,
        message: String,
    },
    Reset,
    FilterChanged(RepoFilter),
    SummaryGenerated {
        login: String,
        summary: String,
    },
    InsightsGenerated {
        login: String,
        insights: InsightsData,
    },
}

impl ViewState {
    pub fn profile(&self) -> Option<&Profile> {
        self.bundle.as_deref().map(|b| &b.profile)
    }

    pub fn login(&self) -> Option<&str> {
        self.profile().map(|p| p.login.as_str())
    }

    /// The ticket the next `AnalysisStarted` will issue.
    pub fn next_ticket(&self) -> Ticket {
        self.next_ticket
    }

    /// Whether a result tagged with `ticket` belongs to the analysis in flight.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.pending == Some(ticket)
    }

    /// False when `event` is a result of a superseded analysis.
    pub fn is_current(&self, event: &Event) -> bool {
        match event {
            Event::ResumeAnalysed { ticket, .. }
            | Event::ProfileLoaded { ticket, .. }
            | Event::Failed { ticket, .. } => self.accepts(*ticket),
            _ => true,
        }
    }

    pub fn cached_summary(&self) -> Option<&str> {
        let login = self.login()?;
        self.summary
            .as_ref()
            .filter(|c| c.login == login)
            .map(|c| c.value.as_str())
    }

    pub fn cached_insights(&self) -> Option<&InsightsData> {
        let login = self.login()?;
        self.insights
            .as_ref()
            .filter(|c| c.login == login)
            .map(|c| &c.value)
    }

    pub fn snapshot(&self, chat: &[ChatEntry]) -> Snapshot {
        let repos = self.bundle.as_deref().map(|b| b.repos.as_slice()).unwrap_or(&[]);
        let filtered = filter_and_sort(repos, &self.filter);
        let top_repos = filtered.iter().take(TOP_REPO_COUNT).cloned().collect();

        Snapshot {
            phase: self.phase,
            error: self.error.clone(),
            loading_history_login: self.loading_history_login.clone(),
            profile: self.profile().cloned(),
            pinned_repos: self
                .bundle
                .as_deref()
                .map(|b| b.pinned_repos.clone())
                .unwrap_or_default(),
            categorized_urls: self.urls.clone(),
            filter: self.filter.clone(),
            language_options: language_options(repos),
            total_repos: repos.len(),
            filtered_repos: filtered,
            top_repos,
            summary: self.cached_summary().map(str::to_string),
            insights: self.cached_insights().cloned(),
            chat: chat.to_vec(),
        }
    }
}

/// Everything the dashboard renders, derived from the view state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub error: Option<String>,
    pub loading_history_login: Option<String>,
    pub profile: Option<Profile>,
    pub pinned_repos: Vec<PinnedRepository>,
    pub categorized_urls: Option<CategorizedUrls>,
    pub filter: RepoFilter,
    pub language_options: Vec<String>,
    pub total_repos: usize,
    pub filtered_repos: Vec<Repository>,
    pub top_repos: Vec<Repository>,
    pub summary: Option<String>,
    pub insights: Option<InsightsData>,
    pub chat: Vec<ChatEntry>,
}

pub fn reduce(state: ViewState, event: Event) -> ViewState {
    if !state.is_current(&event) {
        return state;
    }

    match event {
        Event::GetStarted => ViewState {
            phase: Phase::Input,
            error: None,
            ..state
        },
        Event::InputRejected(message) => ViewState {
            phase: Phase::Error,
            error: Some(message),
            pending: None,
            loading_history_login: None,
            ..state
        },
        Event::AnalysisStarted { history_login } => ViewState {
            phase: Phase::Processing,
            error: None,
            bundle: None,
            urls: None,
            pending: Some(state.next_ticket),
            next_ticket: state.next_ticket + 1,
            loading_history_login: history_login,
            ..state
        },
        Event::ResumeAnalysed { urls, .. } => ViewState {
            urls: Some(urls),
            ..state
        },
        Event::ProfileLoaded { bundle, .. } => ViewState {
            phase: Phase::Success,
            error: None,
            bundle: Some(bundle),
            filter: RepoFilter::default(),
            pending: None,
            loading_history_login: None,
            summary: None,
            insights: None,
            ..state
        },
        Event::Failed { message, .. } => ViewState {
            phase: Phase::Error,
            error: Some(message),
            pending: None,
            loading_history_login: None,
            ..state
        },
        Event::Reset => ViewState {
            next_ticket: state.next_ticket,
            ..ViewState::default()
        },
        Event::FilterChanged(filter) => ViewState { filter, ..state },
        Event::SummaryGenerated { login, summary } => {
            if state.login() != Some(login.as_str()) {
                return state;
            }
            ViewState {
                summary: Some(Cached {
                    login,
                    value: summary,
                }),
                ..state
            }
        }
        Event::InsightsGenerated { login, insights } => {
            if state.login() != Some(login.as_str()) {
                return state;
            }
            ViewState {
                insights: Some(Cached {
                    login,
                    value: insights,
                }),
                ..state
            }
        }
    }
}
