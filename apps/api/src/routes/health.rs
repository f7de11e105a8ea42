use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Service banner.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ATS Resume Analyzer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health
/// Liveness check.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true }))
}
