use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness: the process is up. Does not touch the store.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 until the store answers.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Store is not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
