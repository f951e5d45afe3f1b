//! Build dispatch handler.
//!
//! Turns a synchronous POST into a tracked, detached background build:
//! validate, generate an identifier, spawn the executor, acknowledge with
//! 202. The acknowledgment is final; nothing the build does later can
//! reach this caller.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use buildhook_core::{log_file_name, BuildRequest};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::error_response;
use crate::AppState;

/// Response from an accepted build request.
#[derive(Debug, Serialize)]
pub struct BuildAccepted {
    /// Always `"accepted"`.
    pub status: &'static str,
    /// Human-readable acknowledgment.
    pub message: String,
    /// Identifier correlating this request to its background build.
    pub build_id: String,
    /// Predicted log-file path the external build process is expected to
    /// write; a convention, never verified.
    pub log_file: String,
    /// Rough guidance for the caller.
    pub estimated_time: &'static str,
}

/// Accepts a build request and fires the background build.
///
/// # Errors
///
/// Returns 400 for unparseable JSON, missing/empty fields, or a project
/// name outside `[A-Za-z0-9_-]`; the message names the offending field.
#[instrument(name = "dispatch_build", skip(state, body), fields(body_len = body.len()))]
pub async fn dispatch_build(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match BuildRequest::from_json_bytes(&body) {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, "rejecting build request");
            return error_response(&error);
        },
    };

    let build_id = state.ids.next_id();
    let log_file =
        state.config.logs_dir.join(log_file_name(&request.project_name, build_id));

    info!(
        project = %request.project_name,
        %build_id,
        log_file = %log_file.display(),
        "build request accepted"
    );

    let response = BuildAccepted {
        status: "accepted",
        message: format!("Project build for {} started", request.project_name),
        build_id: build_id.to_string(),
        log_file: log_file.display().to_string(),
        estimated_time: "30-60 seconds",
    };

    // Spawn-and-discard: the task owns the request; its outcome is
    // observable only via the event handler and the build's log file.
    state.executor.spawn(request, build_id);

    (StatusCode::ACCEPTED, Json(response)).into_response()
}
