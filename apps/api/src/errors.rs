use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::github::GitHubError;

const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant except `Internal` carries the human-readable message shown to the
/// user; that same string becomes the dashboard's error message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The input was accepted but yielded nothing usable (e.g. no GitHub link).
    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    RateLimited(String),

    /// GitHub failed or returned an unexpected status.
    #[error("{0}")]
    Upstream(String),

    /// The AI collaborator could not be reached or refused the request.
    #[error("{0}")]
    Llm(String),

    /// The AI answered but the payload violated the expected schema.
    #[error("{0}")]
    InvalidAiResponse(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The single message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<GitHubError> for AppError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::NotFound(_) => AppError::NotFound(err.to_string()),
            GitHubError::InvalidLogin(_) => AppError::Validation(err.to_string()),
            GitHubError::RateLimited => AppError::RateLimited(err.to_string()),
            GitHubError::ServerError { .. } | GitHubError::Api { .. } => {
                AppError::Upstream(err.to_string())
            }
            GitHubError::Http(ref e) => {
                tracing::error!("GitHub transport error: {e}");
                AppError::Upstream(crate::github::GENERIC_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::UnprocessableEntity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY")
            }
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR")
            }
            AppError::InvalidAiResponse(msg) => {
                tracing::error!("Invalid AI response: {msg}");
                (StatusCode::BAD_GATEWAY, "INVALID_AI_RESPONSE")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}
