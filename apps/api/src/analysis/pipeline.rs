//! The background analysis pipeline.
//!
//! One spawned task per job: extract → keyword analysis → scoring →
//! suggestions → report. Stages run sequentially and report progress into
//! the job table. Any stage error moves the job straight to its terminal
//! error state; there are no retries and no cancellation.

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::FileKind;
use crate::keywords::{jd_is_too_short, MAX_JD_TERMS};
use crate::report::render_html_report;
use crate::scoring::{compute_scores, content_signals};
use crate::state::AppState;
use crate::suggestions::build_suggestions;

use super::job::JobState;
use super::{AnalysisResult, KeywordAnalysis};

const PREVIEW_RESUME_CHARS: usize = 1200;
const PREVIEW_JD_CHARS: usize = 600;

/// Entry point spawned by the analyze handler. Pipeline failures are
/// captured into the job; they never propagate to a response.
pub async fn run_analysis(
    state: AppState,
    job_id: Uuid,
    kind: FileKind,
    bytes: Bytes,
    job_description: Option<String>,
) {
    match run_pipeline(&state, job_id, kind, bytes, job_description.as_deref()).await {
        Ok(()) => info!(%job_id, "analysis job done"),
        Err(err) => {
            warn!(%job_id, error = %err, "analysis job failed");
            state.jobs.fail(job_id, err.to_string());
        }
    }
}

async fn run_pipeline(
    state: &AppState,
    job_id: Uuid,
    kind: FileKind,
    bytes: Bytes,
    jd: Option<&str>,
) -> Result<(), AppError> {
    let jobs = &state.jobs;

    jobs.set_status(job_id, JobState::Processing, 10, "Parsing resume...");

    // pdf parsing is CPU-bound; keep it off the async workers
    let extractor = state.extractor.clone();
    let doc = tokio::task::spawn_blocking(move || extractor.extract(kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))??;

    jobs.set_status(job_id, JobState::Processing, 35, "Analyzing keywords...");

    let jd_supplied = jd.is_some_and(|s| !s.trim().is_empty());
    let usable_jd = jd.filter(|s| !jd_is_too_short(s));
    let jd_too_short = jd_supplied && usable_jd.is_none();

    let jd_keywords = match usable_jd {
        Some(text) => state.keywords.extract_terms(text, MAX_JD_TERMS),
        None => state.keywords.fallback_terms(),
    };

    let exact = state.keywords.exact_match(&doc.text, &jd_keywords);
    let semantic = state
        .keywords
        .semantic_match(
            &doc.text,
            &jd_keywords,
            state.embedder.as_ref(),
            state.config.semantic_threshold,
        )
        .await?;

    jobs.set_status(job_id, JobState::Processing, 60, "Scoring resume...");

    let signals = content_signals(&doc.text);
    let scores = compute_scores(exact.coverage, semantic.coverage, &doc.flags, &signals);

    jobs.set_status(job_id, JobState::Processing, 80, "Generating report...");

    let suggestions = build_suggestions(
        &doc.flags,
        &exact.missing,
        &semantic.misses,
        &signals,
        jd_too_short,
    );

    let filename = jobs
        .get(&job_id)
        .map(|j| j.filename)
        .unwrap_or_default();

    let result = AnalysisResult {
        job_id,
        filename,
        resume_text_preview: truncate_chars(&doc.text, PREVIEW_RESUME_CHARS),
        job_description_preview: jd.map(|s| truncate_chars(s, PREVIEW_JD_CHARS)),
        scores,
        keyword_analysis: KeywordAnalysis {
            present: exact.present,
            missing: exact.missing,
            coverage: exact.coverage,
            jd_keywords,
            semantic_matches: semantic.matches,
            semantic_hits: semantic.hits,
            semantic_misses: semantic.misses,
            semantic_coverage: semantic.coverage,
        },
        formatting_flags: doc.flags,
        suggestions,
    };

    // A render failure only disables the download; the result still serves.
    let report_html = match render_html_report(&result) {
        Ok(html) => Some(html),
        Err(err) => {
            warn!(%job_id, error = %err, "report rendering failed, download unavailable");
            None
        }
    };

    jobs.complete(job_id, result, report_html);
    Ok(())
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
