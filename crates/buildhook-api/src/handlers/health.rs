//! Health check handler for service monitoring.
//!
//! Health is computed fresh on every request from filesystem existence
//! checks; nothing is cached. A failed check degrades the status but
//! never fails the request.

use std::time::UNIX_EPOCH;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument};

use super::SERVICE_NAME;
use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status.
    pub status: HealthStatus,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// When the check was performed, as unix-epoch seconds.
    pub timestamp: f64,
    /// Individual prerequisite checks.
    pub checks: HealthChecks,
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All prerequisites present.
    Healthy,
    /// At least one prerequisite missing.
    Degraded,
}

/// Existence checks for the externally provisioned prerequisites.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// All three required directories exist.
    pub directories: bool,
    /// The Terraform generator script exists.
    pub generator_script: bool,
    /// The build-and-upload executable exists.
    pub upload_script: bool,
}

impl HealthChecks {
    fn all_passing(&self) -> bool {
        self.directories && self.generator_script && self.upload_script
    }
}

/// Health check endpoint.
///
/// Returns 200 for both `healthy` and `degraded`; the status field, not
/// the HTTP code, carries the verdict. The checks are five stats on
/// local paths and are recomputed per request.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let config = state.config();

    let required_dirs = [&config.projects_dir, &config.logs_dir, &config.scripts_dir];
    let checks = HealthChecks {
        directories: required_dirs.iter().all(|dir| dir.exists()),
        generator_script: config.generator_script.exists(),
        upload_script: config.build_script.exists(),
    };

    let status =
        if checks.all_passing() { HealthStatus::Healthy } else { HealthStatus::Degraded };

    debug!(?status, "health check completed");

    let timestamp = state
        .clock
        .now_system()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    let response = HealthResponse {
        status,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp,
        checks,
    };

    (StatusCode::OK, Json(response)).into_response()
}
