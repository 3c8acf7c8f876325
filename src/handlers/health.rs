// handlers/health.rs - GET /health

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::app::AppState;

pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.database.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!(error = %err, "database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}
