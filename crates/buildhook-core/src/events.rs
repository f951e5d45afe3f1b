//! Build outcome events and the handler trait that receives them.
//!
//! The dispatcher's 202 acknowledgment is final: a background build has no
//! return channel to its HTTP caller. Outcomes travel through an injected
//! [`BuildEventHandler`] instead, so no component references a global log
//! stream directly and tests can observe terminal events in isolation.

use std::time::Duration;

use tracing::{error, info};

use crate::models::{BuildId, ProjectName};

/// Terminal events emitted by a background build.
///
/// Exactly one terminal event is produced per accepted build request.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// The external build process exited with status zero.
    Succeeded {
        /// Project that was built.
        project: ProjectName,
        /// Identifier of the build.
        build_id: BuildId,
        /// Wall-clock time the build took.
        duration: Duration,
    },

    /// The external build process exited with a non-zero status.
    Failed {
        /// Project whose build failed.
        project: ProjectName,
        /// Identifier of the build.
        build_id: BuildId,
        /// Process exit code, when one was reported.
        exit_code: Option<i32>,
        /// Captured standard error of the build process.
        stderr: String,
    },

    /// The external build process exceeded its deadline and was killed.
    TimedOut {
        /// Project whose build timed out.
        project: ProjectName,
        /// Identifier of the build.
        build_id: BuildId,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The external build process could not be launched at all.
    LaunchFailed {
        /// Project whose build never started.
        project: ProjectName,
        /// Identifier of the build.
        build_id: BuildId,
        /// Description of the launch failure.
        error: String,
    },
}

/// Trait for receiving build outcome events.
///
/// Implementations must not block build processing and must not propagate
/// failures back to the build task; the acknowledgment was already sent.
#[async_trait::async_trait]
pub trait BuildEventHandler: Send + Sync + std::fmt::Debug {
    /// Handles a terminal build event.
    async fn handle_event(&self, event: BuildEvent);
}

/// Production handler that writes one diagnostic line per outcome through
/// `tracing`.
///
/// Successful builds go to the normal stream, everything else to the error
/// stream, each outcome with a distinct message so log consumers can tell
/// a timeout from an ordinary failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventHandler;

impl TracingEventHandler {
    /// Creates a new tracing-backed handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl BuildEventHandler for TracingEventHandler {
    async fn handle_event(&self, event: BuildEvent) {
        match event {
            BuildEvent::Succeeded { project, build_id, duration } => {
                info!(
                    %project,
                    %build_id,
                    duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    "Build completed successfully for project {project}"
                );
            },
            BuildEvent::Failed { project, build_id, exit_code, stderr } => {
                error!(
                    %project,
                    %build_id,
                    exit_code = exit_code.unwrap_or(-1),
                    "Build failed for project {project}: {stderr}"
                );
            },
            BuildEvent::TimedOut { project, build_id, timeout } => {
                error!(
                    %project,
                    %build_id,
                    timeout_seconds = timeout.as_secs(),
                    "Build timeout for project {project} (exceeded {} seconds)",
                    timeout.as_secs()
                );
            },
            BuildEvent::LaunchFailed { project, build_id, error } => {
                error!(
                    %project,
                    %build_id,
                    "Build process error for project {project}: {error}"
                );
            },
        }
    }
}

/// No-op handler that discards all events.
///
/// Useful where a handler is required but outcomes are irrelevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventHandler;

#[async_trait::async_trait]
impl BuildEventHandler for NoOpEventHandler {
    async fn handle_event(&self, _event: BuildEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str) -> ProjectName {
        ProjectName::new(name).expect("valid test project name")
    }

    #[tokio::test]
    async fn noop_handler_accepts_every_variant() {
        let handler = NoOpEventHandler;
        handler
            .handle_event(BuildEvent::Succeeded {
                project: project("demo"),
                build_id: BuildId(1),
                duration: Duration::from_secs(1),
            })
            .await;
        handler
            .handle_event(BuildEvent::TimedOut {
                project: project("demo"),
                build_id: BuildId(2),
                timeout: Duration::from_secs(300),
            })
            .await;
    }

    #[test]
    fn events_compare_by_content() {
        let a = BuildEvent::Failed {
            project: project("demo"),
            build_id: BuildId(7),
            exit_code: Some(2),
            stderr: "boom".into(),
        };
        assert_eq!(a.clone(), a);
    }
}
