//! Recent-build status handler.
//!
//! The status snapshot is derived entirely from the logs directory at
//! request time. A listing may race a build that is writing its log
//! right now; that eventually-consistent read is acceptable and takes
//! no locks.

use std::{io, path::Path, time::UNIX_EPOCH};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use buildhook_core::CoreError;
use serde::Serialize;
use tracing::{instrument, warn};

use super::{error_response, SERVICE_NAME};
use crate::AppState;

/// Number of log entries reported by the status endpoint.
const RECENT_BUILD_LIMIT: usize = 10;

/// Status response structure.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Service name.
    pub service: &'static str,
    /// Seconds since the service started.
    pub uptime: f64,
    /// Up to ten most recent build-log entries, newest name first.
    pub recent_builds: Vec<RecentBuild>,
    /// Directory the entries were listed from.
    pub logs_directory: String,
}

/// One build-log entry.
#[derive(Debug, Serialize)]
pub struct RecentBuild {
    /// Log-file name, `build-<project>-<id>.log`.
    pub filename: String,
    /// File size in bytes.
    pub size: u64,
    /// Modification time as unix-epoch seconds.
    pub modified: f64,
}

/// Status endpoint reporting recent build activity.
///
/// A missing logs directory yields an empty list, not an error; only an
/// unexpected fault while listing yields 500.
#[instrument(name = "build_status", skip(state))]
pub async fn build_status(State(state): State<AppState>) -> Response {
    let logs_dir = &state.config.logs_dir;

    let recent_builds = match list_recent_builds(logs_dir).await {
        Ok(builds) => builds,
        Err(error) => {
            warn!(%error, logs_dir = %logs_dir.display(), "failed to list build logs");
            return error_response(&CoreError::internal(format!(
                "Status check failed: {error}"
            )));
        },
    };

    let response = StatusResponse {
        service: SERVICE_NAME,
        uptime: state.uptime_seconds(),
        recent_builds,
        logs_directory: logs_dir.display().to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Lists `build-*.log` entries, name-descending, truncated to the limit.
async fn list_recent_builds(logs_dir: &Path) -> io::Result<Vec<RecentBuild>> {
    let mut entries = match tokio::fs::read_dir(logs_dir).await {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut log_names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Ok(name) = entry.file_name().into_string() {
            if name.starts_with("build-") && name.ends_with(".log") {
                log_names.push(name);
            }
        }
    }

    log_names.sort_unstable_by(|a, b| b.cmp(a));
    log_names.truncate(RECENT_BUILD_LIMIT);

    let mut recent = Vec::with_capacity(log_names.len());
    for name in log_names {
        // A build log can disappear between the listing and the stat;
        // skip it rather than failing the whole snapshot.
        let Ok(metadata) = tokio::fs::metadata(logs_dir.join(&name)).await else {
            continue;
        };
        let modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |since_epoch| since_epoch.as_secs_f64());

        recent.push(RecentBuild { filename: name, size: metadata.len(), modified });
    }

    Ok(recent)
}
