//! Health check handlers and response types.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use bytes::Bytes;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(crate) struct HealthCheckResponse {
    pub status: String,
    pub staging: String,
    pub blob_backend: String,
    pub relay_backend: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Full health check: staging store round trip plus backend configuration.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);
    const PROBE_KEY: &str = "health:probe";

    let staging = state.staging.clone();
    let staging_status = run_check(
        TIMEOUT,
        async move {
            staging
                .put(PROBE_KEY, Bytes::from_static(b"ok"), Duration::from_secs(5))
                .await?;
            staging.get(PROBE_KEY).await?;
            staging.delete(PROBE_KEY).await
        },
        "unhealthy",
    )
    .await;

    let configured = |on: bool| {
        if on {
            "configured".to_string()
        } else {
            "not_configured".to_string()
        }
    };
    let overall_healthy = staging_status == "healthy";

    let response = HealthCheckResponse {
        status: if overall_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        staging: staging_status,
        blob_backend: configured(state.config.blob_configured()),
        relay_backend: configured(state.config.relay_configured()),
    };

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
