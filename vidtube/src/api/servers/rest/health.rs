//! Health check handler.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::api::dto::ApiResponse;
use crate::api::servers::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/v1/health
pub async fn check(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    let database = match state.platform.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            false
        }
    };

    ApiResponse::ok(
        HealthStatus {
            status: if database { "healthy" } else { "degraded" },
            database,
            timestamp: Utc::now(),
        },
        "OK",
    )
}
