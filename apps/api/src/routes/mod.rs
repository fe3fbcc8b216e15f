pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::dashboard::handlers;
use crate::resume::upload::MAX_RESUME_BYTES;
use crate::state::AppState;
use crate::storage::handlers as storage;

/// Leaves room for multipart framing around a maximum-size resume.
const BODY_LIMIT: usize = MAX_RESUME_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Dashboard sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/start", post(handlers::handle_start))
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .route(
            "/api/v1/sessions/:id/username",
            post(handlers::handle_analyze_username),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume),
        )
        .route(
            "/api/v1/sessions/:id/resume/text",
            post(handlers::handle_resume_text),
        )
        .route(
            "/api/v1/sessions/:id/history/:login",
            post(handlers::handle_select_history),
        )
        .route(
            "/api/v1/sessions/:id/filters",
            patch(handlers::handle_update_filters),
        )
        .route("/api/v1/sessions/:id/summary", post(handlers::handle_summary))
        .route(
            "/api/v1/sessions/:id/insights",
            post(handlers::handle_insights),
        )
        .route(
            "/api/v1/sessions/:id/insights/export",
            get(handlers::handle_export_insights),
        )
        .route(
            "/api/v1/sessions/:id/followers",
            get(handlers::handle_followers),
        )
        .route(
            "/api/v1/sessions/:id/following",
            get(handlers::handle_following),
        )
        .route(
            "/api/v1/sessions/:id/charts/:kind",
            get(handlers::handle_chart),
        )
        .route("/api/v1/sessions/:id/chat", post(handlers::handle_chat))
        // History
        .route(
            "/api/v1/history",
            get(storage::handle_list_history).delete(storage::handle_clear_history),
        )
        .route(
            "/api/v1/history/:login",
            delete(storage::handle_remove_history),
        )
        // Preferences
        .route(
            "/api/v1/preferences/theme",
            get(storage::handle_get_theme).put(storage::handle_set_theme),
        )
        .route(
            "/api/v1/preferences/theme/toggle",
            post(storage::handle_toggle_theme),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::resume::upload::INVALID_FILE_TYPE;
    use crate::testing::{
        profile_fixture, repo_fixture, repo_fixture_dated, test_state, FakeAnalyst, FakeGitHub,
    };

    fn octocat_github() -> FakeGitHub {
        FakeGitHub::new().with_user(
            profile_fixture("octocat", 3),
            vec![
                repo_fixture(1, "hello-world", Some("First repo"), Some("Rust"), 120, 4),
                repo_fixture(2, "spoon-knife", None, Some("HTML"), 30, 12),
                repo_fixture_dated(3, "linguist", 5, 1, 2015, 2023),
            ],
        )
    }

    fn app() -> Router {
        app_with(octocat_github(), FakeAnalyst::new().with_summary("Loves Rust.")).0
    }

    fn app_with(
        github: FakeGitHub,
        analyst: FakeAnalyst,
    ) -> (Router, Arc<FakeGitHub>, Arc<FakeAnalyst>) {
        let (state, github, analyst) = test_state(github, analyst);
        (build_router(state), github, analyst)
    }

    /// Single-field multipart body as a browser form would send it.
    fn multipart_upload(uri: &str, field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let boundary = "gitprofile-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"resume.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_response(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = send_json(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["service"], "gitprofile-api");
    }

    #[tokio::test]
    async fn test_shareable_session_loads_profile() {
        let app = app();
        let (status, json) =
            send_json(&app, "POST", "/api/v1/sessions?username=octocat", None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["phase"], "success");
        assert_eq!(json["profile"]["login"], "octocat");
        assert_eq!(json["top_repos"][0]["name"], "hello-world");

        let (_, history) = send_json(&app, "GET", "/api/v1/history", None).await;
        assert_eq!(history[0]["login"], "octocat");
    }

    #[tokio::test]
    async fn test_session_flow_from_landing() {
        let app = app();
        let (_, created) = send_json(&app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(created["phase"], "landing");
        let id = created["id"].as_str().unwrap().to_string();

        let (_, started) = send_json(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;
        assert_eq!(started["phase"], "input");

        let (_, loaded) = send_json(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/username"),
            Some(json!({"username": "octocat"})),
        )
        .await;
        assert_eq!(loaded["phase"], "success");
        assert_eq!(loaded["language_options"], json!(["All", "HTML", "Rust"]));

        let (_, filtered) = send_json(
            &app,
            "PATCH",
            &format!("/api/v1/sessions/{id}/filters"),
            Some(json!({"language": "HTML"})),
        )
        .await;
        assert_eq!(filtered["filtered_repos"].as_array().unwrap().len(), 1);
        assert_eq!(filtered["total_repos"], 3);

        let (status, summary) =
            send_json(&app, "POST", &format!("/api/v1/sessions/{id}/summary"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["summary"], "Loves Rust.");

        let (_, reset) = send_json(&app, "POST", &format!("/api/v1/sessions/{id}/reset"), None).await;
        assert_eq!(reset["phase"], "landing");
        assert!(reset["profile"].is_null());
    }

    #[tokio::test]
    async fn test_empty_resume_text_is_rejected_in_session() {
        let app = app();
        let (_, created) = send_json(&app, "POST", "/api/v1/sessions", None).await;
        let id = created["id"].as_str().unwrap();

        let (status, json) = send_json(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/resume/text"),
            Some(json!({"text": "   "})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "error");
        assert_eq!(json["error"], "Resume text cannot be empty.");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, json) = send_json(&app(), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_charts_as_json_and_svg() {
        let app = app();
        let (_, created) =
            send_json(&app, "POST", "/api/v1/sessions?username=octocat", None).await;
        let id = created["id"].as_str().unwrap();

        let (status, pie) =
            send_json(&app, "GET", &format!("/api/v1/sessions/{id}/charts/languages"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pie["slices"].as_array().unwrap().len(), 2);

        let (status, svg) =
            send(&app, "GET", &format!("/api/v1/sessions/{id}/charts/stars.svg"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(svg).unwrap().starts_with("<svg"));

        let (status, _) =
            send(&app, "GET", &format!("/api/v1/sessions/{id}/charts/radar"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_theme_toggle_and_hint() {
        let app = app();
        let request = Request::builder()
            .uri("/api/v1/preferences/theme")
            .header("Sec-CH-Prefers-Color-Scheme", "dark")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["theme"], "dark");

        let (_, toggled) =
            send_json(&app, "POST", "/api/v1/preferences/theme/toggle", None).await;
        assert_eq!(toggled["theme"], "dark");

        let (_, set) = send_json(
            &app,
            "PUT",
            "/api/v1/preferences/theme",
            Some(json!({"theme": "light"})),
        )
        .await;
        assert_eq!(set["theme"], "light");
    }

    #[tokio::test]
    async fn test_export_requires_generated_insights() {
        let app = app();
        let (_, created) =
            send_json(&app, "POST", "/api/v1/sessions?username=octocat", None).await;
        let id = created["id"].as_str().unwrap();
        let export = format!("/api/v1/sessions/{id}/insights/export");

        let (status, _) = send(&app, "GET", &export, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "POST", &format!("/api/v1/sessions/{id}/insights"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", &export, None).await;
        assert_eq!(status, StatusCode::OK);
        let markdown = String::from_utf8(body).unwrap();
        assert!(markdown.starts_with("# GitHub AI Insights for octocat"));
        assert!(markdown.contains("- **Total Repositories:** 3"));
    }

    #[tokio::test]
    async fn test_followers_and_following_need_a_profile() {
        let app = app();
        let (_, empty) = send_json(&app, "POST", "/api/v1/sessions", None).await;
        let id = empty["id"].as_str().unwrap();
        let (status, _) = send(&app, "GET", &format!("/api/v1/sessions/{id}/followers"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, loaded) =
            send_json(&app, "POST", "/api/v1/sessions?username=octocat", None).await;
        let id = loaded["id"].as_str().unwrap();
        let (_, followers) =
            send_json(&app, "GET", &format!("/api/v1/sessions/{id}/followers"), None).await;
        assert_eq!(followers.as_array().unwrap().len(), 2);
        let (_, following) =
            send_json(&app, "GET", &format!("/api/v1/sessions/{id}/following"), None).await;
        assert_eq!(following[0]["login"], "followed-one");
    }

    #[tokio::test]
    async fn test_pdf_upload_loads_linked_profile() {
        let (app, _, analyst) = app_with(
            octocat_github(),
            FakeAnalyst::new().with_github_url("https://github.com/octocat"),
        );
        let (_, created) = send_json(&app, "POST", "/api/v1/sessions", None).await;
        let id = created["id"].as_str().unwrap();

        let request = multipart_upload(
            &format!("/api/v1/sessions/{id}/resume"),
            "file",
            "application/pdf",
            b"%PDF-1.4\nJane Doe - github.com/octocat\n%%EOF",
        );
        let (status, json) = json_response(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "success");
        assert_eq!(json["profile"]["login"], "octocat");
        assert_eq!(analyst.resume_calls(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let (app, github, analyst) = app_with(octocat_github(), FakeAnalyst::new());
        let (_, created) = send_json(&app, "POST", "/api/v1/sessions", None).await;
        let id = created["id"].as_str().unwrap();

        let request = multipart_upload(
            &format!("/api/v1/sessions/{id}/resume"),
            "document",
            "application/pdf",
            b"%PDF-1.4",
        );
        let (status, json) = json_response(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "error");
        assert_eq!(json["error"], INVALID_FILE_TYPE);
        assert_eq!(analyst.resume_calls(), 0);
        assert_eq!(github.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_with_non_pdf_type_is_rejected() {
        let (app, github, analyst) = app_with(octocat_github(), FakeAnalyst::new());
        let (_, created) = send_json(&app, "POST", "/api/v1/sessions", None).await;
        let id = created["id"].as_str().unwrap();

        let request = multipart_upload(
            &format!("/api/v1/sessions/{id}/resume"),
            "file",
            "text/plain",
            b"%PDF-1.4 but really a text file",
        );
        let (status, json) = json_response(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["phase"], "error");
        assert_eq!(json["error"], INVALID_FILE_TYPE);
        assert_eq!(analyst.resume_calls(), 0);
        assert_eq!(github.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_connection_failures_name_the_login() {
        let (app, _, _) = app_with(
            octocat_github().failing_connections(500),
            FakeAnalyst::new(),
        );
        let (_, loaded) =
            send_json(&app, "POST", "/api/v1/sessions?username=octocat", None).await;
        assert_eq!(loaded["phase"], "success");
        let id = loaded["id"].as_str().unwrap();

        let (status, json) =
            send_json(&app, "GET", &format!("/api/v1/sessions/{id}/followers"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(json["error"]["message"], "Failed to fetch followers for \"octocat\".");

        let (status, json) =
            send_json(&app, "GET", &format!("/api/v1/sessions/{id}/following"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            json["error"]["message"],
            "Failed to fetch users followed by \"octocat\"."
        );
    }
}
