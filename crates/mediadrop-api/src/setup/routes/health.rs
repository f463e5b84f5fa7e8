//! Health check handlers and response types.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;

#[derive(Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    /// "healthy", "timeout", or "unhealthy: {reason}"
    pub media_host: String,
    pub backend: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness of the media host; 503 when it is unreachable or slow.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let host = state.media.host.clone();
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

    let media_host = match tokio::time::timeout(timeout, host.health_check()).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Media host health check failed");
            format!("unhealthy: {}", e)
        }
        Err(_) => {
            tracing::warn!("Media host health check timed out");
            "timeout".to_string()
        }
    };

    let healthy = media_host == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        media_host,
        backend: host.backend_type().to_string(),
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
