//! Health check endpoint.
//!
//! Public; used by load balancers and uptime monitors.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub checked_at: String,
}

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = state.db.health_check().await;

    let (status, code) = if database_ok {
        ("serving", StatusCode::OK)
    } else {
        tracing::warn!("Health check failed: database unreachable");
        ("not_serving", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            database: if database_ok { "ok" } else { "unreachable" },
            version: env!("CARGO_PKG_VERSION"),
            checked_at: Utc::now().to_rfc3339(),
        }),
    )
}
