use std::path::PathBuf;

use anyhow::{Context, Result};

/// Deployment environment. Dev disables rate limiting entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Production,
}

/// Application configuration loaded from environment variables.
/// Everything has a working default so a bare `cargo run` serves locally.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub env: Environment,
    /// Daily per-IP analysis quota applied in production.
    pub rate_limit_per_day: u32,
    /// Cosine similarity cutoff for counting a keyword as a semantic hit.
    pub semantic_threshold: f32,
    /// Completed/errored jobs are evicted after this many minutes.
    pub job_ttl_minutes: u64,
    /// Optional newline-delimited keyword list used when no job description
    /// is supplied. Falls back to the built-in skill list when unset.
    pub fallback_keywords: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let env = match std::env::var("ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Dev,
        };

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            env,
            rate_limit_per_day: parse_env("RATE_LIMIT_PER_DAY", 5)?,
            semantic_threshold: parse_env("SEMANTIC_THRESHOLD", 0.62)?,
            job_ttl_minutes: parse_env("JOB_TTL_MINUTES", 60)?,
            fallback_keywords: std::env::var("FALLBACK_KEYWORDS").ok().map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Effective daily quota: `None` means unlimited (dev mode).
    pub fn rate_limit_quota(&self) -> Option<u32> {
        match self.env {
            Environment::Dev => None,
            Environment::Production => Some(self.rate_limit_per_day),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_quota_is_unlimited() {
        let config = Config {
            port: 8080,
            env: Environment::Dev,
            rate_limit_per_day: 5,
            semantic_threshold: 0.62,
            job_ttl_minutes: 60,
            fallback_keywords: None,
            rust_log: "info".to_string(),
        };
        assert_eq!(config.rate_limit_quota(), None);
    }

    #[test]
    fn test_production_quota_is_bounded() {
        let config = Config {
            port: 8080,
            env: Environment::Production,
            rate_limit_per_day: 5,
            semantic_threshold: 0.62,
            job_ttl_minutes: 60,
            fallback_keywords: None,
            rust_log: "info".to_string(),
        };
        assert_eq!(config.rate_limit_quota(), Some(5));
    }
}
