use std::sync::Arc;

use crate::analyst::ProfileAnalyst;
use crate::dashboard::SessionStore;
use crate::github::GitHubSource;
use crate::storage::{HistoryStore, PreferenceStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// GitHub REST API plus the pinned-repos scraper. Production: `GitHubClient`.
    pub github: Arc<dyn GitHubSource>,
    /// AI analysis. Production: `ClaudeAnalyst`.
    pub analyst: Arc<dyn ProfileAnalyst>,
    pub history: Arc<HistoryStore>,
    pub preferences: Arc<PreferenceStore>,
    pub sessions: Arc<SessionStore>,
}
