use std::str::FromStr;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyst::insights::{export_markdown, ExportStats};
use crate::analyst::{ChatEntry, InsightsData};
use crate::dashboard::charts::{
    bar_chart, line_chart, pie_chart, render_bar_svg, render_line_svg, render_pie_svg,
};
use crate::dashboard::pipeline::{self, loaded_bundle};
use crate::dashboard::projection::{
    activity_timeline, language_histogram, last_activity_label, star_ranking, RepoFilter,
    SortKey, TOP_REPO_COUNT,
};
use crate::dashboard::sessions::SharedSession;
use crate::dashboard::state::{Event, Snapshot};
use crate::errors::AppError;
use crate::github::GithubUser;
use crate::resume::upload::INVALID_FILE_TYPE;
use crate::resume::ResumeContent;
use crate::state::AppState;

const RESUME_FIELD: &str = "file";
const SVG_SUFFIX: &str = ".svg";

#[derive(Deserialize)]
pub struct CreateSessionQuery {
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

#[derive(Deserialize)]
pub struct ResumeTextRequest {
    pub text: String,
}

/// Partial filter update; omitted fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct FilterUpdate {
    pub query: Option<String>,
    pub language: Option<String>,
    pub sort: Option<SortKey>,
}

impl FilterUpdate {
    fn apply_to(self, current: &RepoFilter) -> RepoFilter {
        RepoFilter {
            query: self.query.unwrap_or_else(|| current.query.clone()),
            language: self.language.unwrap_or_else(|| current.language.clone()),
            sort: self.sort.unwrap_or(current.sort),
        }
    }
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

async fn respond(id: Uuid, session: &SharedSession) -> Json<SessionResponse> {
    let snapshot = session.lock().await.snapshot();
    Json(SessionResponse { id, snapshot })
}

/// POST /api/v1/sessions[?username=]
pub async fn handle_create_session(
    State(state): State<AppState>,
    Query(params): Query<CreateSessionQuery>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, session) = state.sessions.create().await;
    info!("Created dashboard session {id}");

    if let Some(username) = params.username {
        pipeline::analyze_username(&state, &session, &username, None).await;
    }
    (StatusCode::CREATED, respond(id, &session).await)
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(respond(id, &session).await)
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_event(
    state: &AppState,
    id: Uuid,
    event: Event,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    session.lock().await.apply(event);
    Ok(respond(id, &session).await)
}

/// POST /api/v1/sessions/:id/start
pub async fn handle_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    apply_event(&state, id, Event::GetStarted).await
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    apply_event(&state, id, Event::Reset).await
}

/// PATCH /api/v1/sessions/:id/filters
pub async fn handle_update_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FilterUpdate>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    {
        let mut session = session.lock().await;
        let filter = update.apply_to(&session.view.filter);
        session.apply(Event::FilterChanged(filter));
    }
    Ok(respond(id, &session).await)
}

/// POST /api/v1/sessions/:id/username
pub async fn handle_analyze_username(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UsernameRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    pipeline::analyze_username(&state, &session, &req.username, None).await;
    Ok(respond(id, &session).await)
}

/// POST /api/v1/sessions/:id/history/:login
pub async fn handle_select_history(
    State(state): State<AppState>,
    Path((id, login)): Path<(Uuid, String)>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    pipeline::analyze_username(&state, &session, &login, Some(login.clone())).await;
    Ok(respond(id, &session).await)
}

/// Reads the `file` field of a resume upload.
async fn read_resume_upload(mut multipart: Multipart) -> Result<ResumeContent, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return ResumeContent::from_upload(content_type.as_deref(), bytes);
    }
    Err(AppError::Validation(INVALID_FILE_TYPE.to_string()))
}

/// POST /api/v1/sessions/:id/resume (multipart, field `file`)
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    match read_resume_upload(multipart).await {
        Ok(resume) => pipeline::analyze_resume(&state, &session, resume).await,
        Err(e) => pipeline::reject(&session, e).await,
    }
    Ok(respond(id, &session).await)
}

/// POST /api/v1/sessions/:id/resume/text
pub async fn handle_resume_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResumeTextRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    match ResumeContent::from_text(&req.text) {
        Ok(resume) => pipeline::analyze_resume(&state, &session, resume).await,
        Err(e) => pipeline::reject(&session, e).await,
    }
    Ok(respond(id, &session).await)
}

/// POST /api/v1/sessions/:id/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let summary = pipeline::summary(&state, &session).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /api/v1/sessions/:id/insights
pub async fn handle_insights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InsightsData>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(pipeline::insights(&state, &session).await?))
}

/// GET /api/v1/sessions/:id/insights/export
pub async fn handle_export_insights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    let bundle = loaded_bundle(&session.view)?;
    let insights = session.view.cached_insights().ok_or_else(|| {
        AppError::NotFound("Generate insights before exporting them.".to_string())
    })?;

    let stats = ExportStats {
        language_count: language_histogram(&bundle.repos).len(),
        total_repositories: bundle.profile.public_repos,
        last_activity: last_activity_label(&bundle.repos, Utc::now()),
    };
    let markdown = export_markdown(&bundle.profile, insights, &stats);
    let disposition = format!(
        "attachment; filename=\"{}-insights.md\"",
        bundle.profile.login
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        markdown,
    )
        .into_response())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connections {
    Followers,
    Following,
}

async fn connections(
    state: &AppState,
    id: Uuid,
    which: Connections,
) -> Result<Json<Vec<GithubUser>>, AppError> {
    let session = state.sessions.get(id).await?;
    let login = {
        let session = session.lock().await;
        loaded_bundle(&session.view)?.profile.login.clone()
    };
    let (users, message) = match which {
        Connections::Followers => (
            state.github.followers(&login).await,
            format!("Failed to fetch followers for \"{login}\"."),
        ),
        Connections::Following => (
            state.github.following(&login).await,
            format!("Failed to fetch users followed by \"{login}\"."),
        ),
    };
    users.map(Json).map_err(|e| {
        warn!("{message} {e}");
        AppError::Upstream(message)
    })
}

/// GET /api/v1/sessions/:id/followers
pub async fn handle_followers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GithubUser>>, AppError> {
    connections(&state, id, Connections::Followers).await
}

/// GET /api/v1/sessions/:id/following
pub async fn handle_following(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GithubUser>>, AppError> {
    connections(&state, id, Connections::Following).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Languages,
    Stars,
    Activity,
}

impl FromStr for ChartKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "languages" => Ok(ChartKind::Languages),
            "stars" => Ok(ChartKind::Stars),
            "activity" => Ok(ChartKind::Activity),
            other => Err(AppError::NotFound(format!("Unknown chart '{other}'"))),
        }
    }
}

/// GET /api/v1/sessions/:id/charts/:kind
///
/// `languages`, `stars` or `activity` as JSON geometry (`null` when there is
/// nothing to draw); append `.svg` for a rendered image.
pub async fn handle_chart(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let (name, as_svg) = match kind.strip_suffix(SVG_SUFFIX) {
        Some(name) => (name, true),
        None => (kind.as_str(), false),
    };
    let kind: ChartKind = name.parse()?;

    let session = state.sessions.get(id).await?;
    let bundle = {
        let session = session.lock().await;
        loaded_bundle(&session.view)?
    };
    let repos = &bundle.repos;

    let (json, svg) = match kind {
        ChartKind::Languages => {
            let chart = pie_chart(&language_histogram(repos));
            (
                serde_json::to_value(&chart),
                chart.as_ref().map(render_pie_svg),
            )
        }
        ChartKind::Stars => {
            let chart = bar_chart(&star_ranking(repos, TOP_REPO_COUNT));
            (
                serde_json::to_value(&chart),
                chart.as_ref().map(render_bar_svg),
            )
        }
        ChartKind::Activity => {
            let chart = line_chart(&activity_timeline(repos));
            (
                serde_json::to_value(&chart),
                chart.as_ref().map(render_line_svg),
            )
        }
    };

    if as_svg {
        let svg = svg.ok_or_else(|| {
            AppError::NotFound("Not enough data to draw this chart.".to_string())
        })?;
        return Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response());
    }
    let json = json.map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(json).into_response())
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatEntry>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(pipeline::chat(&state, &session, &req.message).await?))
}
