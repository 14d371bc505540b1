//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (the guards need the token tables)
//! - /health/live - Liveness probe

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseStatus>,
}

#[derive(Serialize)]
pub struct DatabaseStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn status(status: &'static str) -> HealthResponse {
    HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database: None,
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(status("healthy"))
}

/// Returns 503 while the database is unreachable, since every customer
/// request needs a token lookup
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match db::health_check(state.db()).await {
        Ok(latency) => Ok(Json(HealthResponse {
            database: Some(DatabaseStatus {
                healthy: true,
                latency_ms: Some(latency.as_millis() as u64),
                message: None,
            }),
            ..status("ready")
        })),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                database: Some(DatabaseStatus {
                    healthy: false,
                    latency_ms: None,
                    message: Some(e.to_string()),
                }),
                ..status("not_ready")
            }),
        )),
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(status("alive"))
}
