use std::net::SocketAddr;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atscan::analysis::job::run_sweeper;
use atscan::config::Config;
use atscan::routes::build_router;
use atscan::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS analyzer API v{}", env!("CARGO_PKG_VERSION"));

    let fallback_keywords = load_fallback_keywords(&config)?;
    let state = AppState::build(config.clone(), fallback_keywords)?;

    // Background eviction of expired jobs
    tokio::spawn(run_sweeper(state.jobs.clone(), config.job_ttl_minutes));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Reads the optional newline-delimited keyword list configured via
/// `FALLBACK_KEYWORDS`. `None` keeps the built-in skill vocabulary.
fn load_fallback_keywords(config: &Config) -> Result<Option<Vec<String>>> {
    let Some(path) = &config.fallback_keywords else {
        return Ok(None);
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read FALLBACK_KEYWORDS file {}", path.display()))?;
    let terms: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|ln| !ln.is_empty())
        .map(String::from)
        .collect();
    info!(count = terms.len(), "loaded fallback keyword list");
    Ok(Some(terms))
}
