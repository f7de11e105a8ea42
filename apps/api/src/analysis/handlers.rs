//! HTTP handlers for the analysis job lifecycle: upload, status polling,
//! result retrieval and report download.

use std::net::SocketAddr;
use std::path::Path as FsPath;

use axum::{
    extract::{ConnectInfo, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{FileKind, MAX_FILE_BYTES, MAX_FILE_MB};
use crate::state::AppState;

use super::job::{Job, JobState};
use super::pipeline::run_analysis;
use super::AnalysisResult;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: bool,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: bool,
    pub job_id: Uuid,
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
}

/// POST /api/analyze
///
/// Multipart upload: `resume` file (required) plus optional
/// `job_description` text. Validation and the rate limit run synchronously;
/// everything after the returned job id is asynchronous.
pub async fn handle_analyze(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    state.rate_limiter.check_and_increment(addr.ip())?;

    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("resume field has no filename".into()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
                resume = Some((filename, bytes));
            }
            Some("job_description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read job description: {e}"))
                })?;
                if !text.trim().is_empty() {
                    job_description = Some(text);
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        resume.ok_or_else(|| AppError::Validation("multipart field 'resume' is required".into()))?;

    let kind = FileKind::from_filename(&filename)
        .ok_or_else(|| AppError::UnsupportedFormat(extension_of(&filename)))?;

    if bytes.len() > MAX_FILE_BYTES {
        return Err(AppError::FileTooLarge(MAX_FILE_MB));
    }

    let job_id = Uuid::new_v4();
    state.jobs.insert(Job::new(job_id, filename));
    info!(%job_id, ip = %addr.ip(), "analysis job queued");

    tokio::spawn(run_analysis(
        state.clone(),
        job_id,
        kind,
        bytes,
        job_description,
    ));

    Ok(Json(AnalyzeResponse {
        status: true,
        job_id,
    }))
}

/// GET /api/status/:job_id
pub async fn handle_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let job = state
        .jobs
        .get(&job_id)
        .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

    Ok(Json(StatusResponse {
        status: true,
        job_id,
        state: job.state,
        progress: job.progress,
        message: job.message,
        error: job.error,
    }))
}

/// GET /api/result/:job_id
/// 404 until the job has reached `done`.
pub async fn handle_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<AnalysisResult>, AppError> {
    let result = state
        .jobs
        .get(&job_id)
        .and_then(|job| job.result)
        .ok_or_else(|| AppError::NotFound("Result not found".into()))?;

    Ok(Json(result))
}

/// GET /api/download/:job_id
/// Serves the rendered report as an attachment. 404 until the job is done,
/// or indefinitely when rendering failed.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .jobs
        .get(&job_id)
        .and_then(|job| job.report_html)
        .ok_or_else(|| AppError::NotFound("Report not found".into()))?;

    let headers = [
        (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"ATS_Report_{job_id}.html\""),
        ),
    ];
    Ok((headers, report))
}

fn extension_of(filename: &str) -> String {
    FsPath::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("none")
        .to_string()
}
