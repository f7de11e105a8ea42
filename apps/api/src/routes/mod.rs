pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::extract::MAX_FILE_BYTES;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/analyze", post(handlers::handle_analyze))
        .route("/api/status/:job_id", get(handlers::handle_status))
        .route("/api/result/:job_id", get(handlers::handle_result))
        .route("/api/download/:job_id", get(handlers::handle_download))
        // Raise axum's 2 MB default so oversize uploads reach our own
        // validation and fail with FILE_TOO_LARGE instead of a bare 413.
        .layer(DefaultBodyLimit::max(MAX_FILE_BYTES * 2))
        .with_state(state)
}
