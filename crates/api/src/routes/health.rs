//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Health check routes, mounted at the root (not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(liveness))
        .route("/healthz/ready", get(readiness))
}

/// Liveness: the process is up. No dependencies are touched.
async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness: the database answers a ping.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match ratecraft_db::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
