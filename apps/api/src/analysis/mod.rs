//! Analysis jobs: data model, in-memory job table, background pipeline and
//! the HTTP handlers that front them.

pub mod handlers;
pub mod job;
pub mod pipeline;

use serde::Serialize;
use uuid::Uuid;

use crate::extract::FormattingFlags;
use crate::keywords::SemanticMatch;
use crate::scoring::Scores;
use crate::suggestions::Suggestions;

/// Keyword section of the result payload: the literal present/missing
/// partition plus the semantic near-matches.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordAnalysis {
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub coverage: f64,
    pub jd_keywords: Vec<String>,
    pub semantic_matches: Vec<SemanticMatch>,
    pub semantic_hits: Vec<String>,
    pub semantic_misses: Vec<String>,
    pub semantic_coverage: f64,
}

/// Full result payload served by `/api/result/{job_id}` once a job is done.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub job_id: Uuid,
    pub filename: String,
    pub resume_text_preview: String,
    pub job_description_preview: Option<String>,
    pub scores: Scores,
    pub keyword_analysis: KeywordAnalysis,
    pub formatting_flags: FormattingFlags,
    pub suggestions: Suggestions,
}
