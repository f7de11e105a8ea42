use std::sync::Arc;

use crate::analysis::job::JobTable;
use crate::config::Config;
use crate::embedding::{Embedder, HashedNgramEmbedder};
use crate::extract::DocumentExtractor;
use crate::keywords::KeywordEngine;
use crate::ratelimit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobTable,
    pub rate_limiter: Arc<RateLimiter>,
    pub keywords: Arc<KeywordEngine>,
    /// Pluggable embedding backend. Default: hashed-trigram embedder; swap
    /// in a model-backed implementation at startup.
    pub embedder: Arc<dyn Embedder>,
    pub extractor: Arc<DocumentExtractor>,
    pub config: Config,
}

impl AppState {
    /// Wires every component from config. `fallback_keywords` overrides the
    /// built-in skill list used when no job description is supplied.
    pub fn build(config: Config, fallback_keywords: Option<Vec<String>>) -> anyhow::Result<Self> {
        Ok(Self {
            jobs: JobTable::new(),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_quota())),
            keywords: Arc::new(KeywordEngine::new(fallback_keywords)?),
            embedder: Arc::new(HashedNgramEmbedder::default()),
            extractor: Arc::new(DocumentExtractor::new()?),
            config,
        })
    }
}
