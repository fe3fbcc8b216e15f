//! Analysis pipelines driving a dashboard session.
//!
//! The session lock is held only to apply events, never across a GitHub or AI
//! call; chat turns are the exception and hold it for the whole turn.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::analyst::{ChatEntry, InsightsData};
use crate::dashboard::sessions::SharedSession;
use crate::dashboard::state::{Event, Ticket, ViewState};
use crate::errors::AppError;
use crate::github::{fetch_profile_bundle, is_valid_login, ProfileBundle, INVALID_USERNAME};
use crate::resume::{resolve_username, ResumeContent};
use crate::state::AppState;

pub const EMPTY_USERNAME: &str = "Username cannot be empty.";
pub const NO_PROFILE_LOADED: &str = "No profile is loaded in this session.";

/// Puts the session in the error phase for input that never reached the network.
pub async fn reject(session: &SharedSession, err: AppError) {
    session
        .lock()
        .await
        .apply(Event::InputRejected(err.user_message()));
}

pub async fn analyze_username(
    state: &AppState,
    session: &SharedSession,
    username: &str,
    history_login: Option<String>,
) {
    let username = username.trim();
    if username.is_empty() {
        reject(session, AppError::Validation(EMPTY_USERNAME.to_string())).await;
        return;
    }
    if !is_valid_login(username) {
        reject(session, AppError::Validation(INVALID_USERNAME.to_string())).await;
        return;
    }

    let ticket = start(session, history_login).await;
    load_profile(state, session, ticket, username).await;
}

/// Resume analysis: extract links, resolve the login, then load the profile.
/// No GitHub request is made unless a usable profile link was found.
pub async fn analyze_resume(state: &AppState, session: &SharedSession, resume: ResumeContent) {
    let ticket = start(session, None).await;
    let resume = resume.with_text_layer().await;

    let analysis = match state.analyst.extract_resume_links(&resume).await {
        Ok(analysis) => analysis,
        Err(e) => return fail(session, ticket, e).await,
    };

    let still_current = session.lock().await.apply(Event::ResumeAnalysed {
        ticket,
        urls: analysis.categorized_urls(),
    });
    if !still_current {
        return;
    }

    match resolve_username(&analysis) {
        Ok(login) => {
            info!("Resume resolved to GitHub user {login}");
            load_profile(state, session, ticket, &login).await;
        }
        Err(e) => fail(session, ticket, e).await,
    }
}

async fn start(session: &SharedSession, history_login: Option<String>) -> Ticket {
    let mut session = session.lock().await;
    let ticket = session.view.next_ticket();
    session.apply(Event::AnalysisStarted { history_login });
    ticket
}

async fn load_profile(state: &AppState, session: &SharedSession, ticket: Ticket, login: &str) {
    match fetch_profile_bundle(state.github.as_ref(), login).await {
        Ok(bundle) => {
            let profile = bundle.profile.clone();
            let applied = session.lock().await.apply(Event::ProfileLoaded {
                ticket,
                bundle: Arc::new(bundle),
            });
            if applied {
                state.history.add(profile).await;
            }
        }
        Err(e) => fail(session, ticket, e.into()).await,
    }
}

async fn fail(session: &SharedSession, ticket: Ticket, err: AppError) {
    warn!("Analysis failed: {err}");
    session.lock().await.apply(Event::Failed {
        ticket,
        message: err.user_message(),
    });
}

pub fn loaded_bundle(view: &ViewState) -> Result<Arc<ProfileBundle>, AppError> {
    view.bundle
        .clone()
        .ok_or_else(|| AppError::Validation(NO_PROFILE_LOADED.to_string()))
}

/// Returns the cached summary for the loaded profile, generating it on first use.
pub async fn summary(state: &AppState, session: &SharedSession) -> Result<String, AppError> {
    let bundle = {
        let session = session.lock().await;
        if let Some(cached) = session.view.cached_summary() {
            return Ok(cached.to_string());
        }
        loaded_bundle(&session.view)?
    };

    let summary = state
        .analyst
        .summarize(&bundle.profile, &bundle.repos)
        .await?;
    session.lock().await.apply(Event::SummaryGenerated {
        login: bundle.profile.login.clone(),
        summary: summary.clone(),
    });
    Ok(summary)
}

/// Returns the cached insight scores for the loaded profile, generating them on first use.
pub async fn insights(state: &AppState, session: &SharedSession) -> Result<InsightsData, AppError> {
    let bundle = {
        let session = session.lock().await;
        if let Some(cached) = session.view.cached_insights() {
            return Ok(cached.clone());
        }
        loaded_bundle(&session.view)?
    };

    let insights = state
        .analyst
        .score_insights(&bundle.profile, &bundle.repos, Utc::now())
        .await?;
    session.lock().await.apply(Event::InsightsGenerated {
        login: bundle.profile.login.clone(),
        insights: insights.clone(),
    });
    Ok(insights)
}

pub async fn chat(
    state: &AppState,
    session: &SharedSession,
    message: &str,
) -> Result<ChatEntry, AppError> {
    let mut session = session.lock().await;
    session.chat.send(state.analyst.as_ref(), message).await
}
