use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::github::Profile;
use crate::state::AppState;
use crate::storage::preferences::{Theme, COLOR_SCHEME_HINT};

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

fn color_scheme_hint(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(COLOR_SCHEME_HINT)
        .and_then(|v| v.to_str().ok())
}

/// GET /api/v1/history
pub async fn handle_list_history(State(state): State<AppState>) -> Json<Vec<Profile>> {
    Json(state.history.list().await)
}

/// DELETE /api/v1/history
pub async fn handle_clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.clear().await;
    StatusCode::NO_CONTENT
}

/// DELETE /api/v1/history/:login
pub async fn handle_remove_history(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Json<Vec<Profile>> {
    Json(state.history.remove(&login).await)
}

/// GET /api/v1/preferences/theme
pub async fn handle_get_theme(State(state): State<AppState>, headers: HeaderMap) -> Json<ThemeBody> {
    let theme = state.preferences.theme(color_scheme_hint(&headers)).await;
    Json(ThemeBody { theme })
}

/// PUT /api/v1/preferences/theme
pub async fn handle_set_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> Json<ThemeBody> {
    let theme = state.preferences.set_theme(body.theme).await;
    Json(ThemeBody { theme })
}

/// POST /api/v1/preferences/theme/toggle
pub async fn handle_toggle_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ThemeBody> {
    let theme = state
        .preferences
        .toggle_theme(color_scheme_hint(&headers))
        .await;
    Json(ThemeBody { theme })
}
