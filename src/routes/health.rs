//! Health check endpoints for liveness and readiness probes
//!
//! - `/health` - Basic liveness check (always returns OK if app is running)
//! - `/readiness` - Deep readiness check (verifies database connectivity)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::db::Repository;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn readiness_check(State(repo): State<Repository>) -> impl IntoResponse {
    let database = match repo.ping().await {
        Ok(()) => CheckResult {
            healthy: true,
            error: None,
        },
        Err(e) => CheckResult {
            healthy: false,
            error: Some(e.to_string()),
        },
    };

    let status = if database.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if database.healthy { "ready" } else { "not ready" },
            version: env!("CARGO_PKG_VERSION"),
            checks: HealthChecks { database },
        }),
    )
}
