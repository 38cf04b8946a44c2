//! Liveness check with storage record counts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::server::AppState;

/// `GET /health`
///
/// 200 with record counts, or 503 when the storage backend does not answer.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = state.storage.backend_name();

    match state.storage.stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "storage": backend,
                "sessionCount": stats.session_count,
                "shopCount": stats.shop_count,
            })),
        ),
        Err(e) => {
            error!(storage = backend, error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "storage": backend })),
            )
        }
    }
}
