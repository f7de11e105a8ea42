use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upload-time failures (validation, quota) surface synchronously through
/// this mapping; pipeline-stage failures are captured into the owning job's
/// error state instead and only reach clients via status polling.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large (max {0} MB)")]
    FileTooLarge(u64),

    #[error("Could not read document: {0}")]
    CorruptDocument(String),

    #[error("No extractable text found in document")]
    EmptyContent,

    #[error("Report rendering failed: {0}")]
    Render(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0} free analyses/day per IP")]
    RateLimited(u32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::UnsupportedFormat(msg) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                format!("Unsupported file format: {msg}. Only PDF or DOCX supported."),
            ),
            AppError::FileTooLarge(mb) => (
                StatusCode::BAD_REQUEST,
                "FILE_TOO_LARGE",
                format!("File too large (max {mb} MB)."),
            ),
            AppError::CorruptDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CORRUPT_DOCUMENT",
                format!("Could not read document: {msg}"),
            ),
            AppError::EmptyContent => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_CONTENT",
                "No extractable text found in document.".to_string(),
            ),
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "Report rendering failed.".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::RateLimited(quota) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded: {quota} free analyses/day per IP."),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
