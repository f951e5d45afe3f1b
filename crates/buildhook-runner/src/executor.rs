//! Detached execution of the external build process.
//!
//! The executor is spawn-and-discard: the dispatcher hands it an owned
//! request plus identifier and never awaits the task. Outcomes are
//! reported only through the injected event handler.

use std::{path::PathBuf, process::Stdio, sync::Arc, time::Duration};

use buildhook_core::{BuildEvent, BuildEventHandler, BuildId, BuildRequest};
use tokio::{process::Command, time::Instant};
use tracing::debug;

use crate::{error::BuildError, spec_file::SpecFile, DEFAULT_BUILD_TIMEOUT_SECONDS};

/// Configuration for external build execution.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path of the build-and-upload executable.
    pub build_script: PathBuf,

    /// Deadline for a single build; the process is killed on expiry.
    pub build_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            build_script: PathBuf::from("/opt/project-builder/build-and-upload.sh"),
            build_timeout: Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECONDS),
        }
    }
}

/// Terminal result of one background build.
///
/// Produced exactly once per accepted request and reported through the
/// event handler; never returned to the HTTP caller.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// The external process exited with status zero.
    Succeeded,

    /// The external process exited with a non-zero status.
    Failed {
        /// Exit code, when the process reported one.
        exit_code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The deadline elapsed and the process was killed.
    TimedOut {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The process never started.
    LaunchFailed {
        /// Description of the launch failure.
        error: String,
    },
}

/// Runs external builds as detached background tasks.
#[derive(Clone)]
pub struct BuildExecutor {
    config: RunnerConfig,
    events: Arc<dyn BuildEventHandler>,
}

impl BuildExecutor {
    /// Creates an executor with the given configuration and event handler.
    pub fn new(config: RunnerConfig, events: Arc<dyn BuildEventHandler>) -> Self {
        Self { config, events }
    }

    /// Spawns a detached task executing the build and returns immediately.
    ///
    /// The task owns all its inputs; the join handle is deliberately
    /// discarded. The outcome is observable only through the event
    /// handler and the log file the external process writes.
    pub fn spawn(&self, request: BuildRequest, build_id: BuildId) {
        let executor = self.clone();
        tokio::spawn(async move {
            executor.execute(request, build_id).await;
        });
    }

    /// Executes one build to completion and reports its terminal event.
    ///
    /// Exposed for direct use in tests; production code goes through
    /// [`BuildExecutor::spawn`].
    pub async fn execute(&self, request: BuildRequest, build_id: BuildId) -> BuildOutcome {
        let started = Instant::now();
        let outcome = self.run_build(&request, build_id).await;
        let event = match &outcome {
            BuildOutcome::Succeeded => BuildEvent::Succeeded {
                project: request.project_name.clone(),
                build_id,
                duration: started.elapsed(),
            },
            BuildOutcome::Failed { exit_code, stderr } => BuildEvent::Failed {
                project: request.project_name.clone(),
                build_id,
                exit_code: *exit_code,
                stderr: stderr.clone(),
            },
            BuildOutcome::TimedOut { timeout } => BuildEvent::TimedOut {
                project: request.project_name.clone(),
                build_id,
                timeout: *timeout,
            },
            BuildOutcome::LaunchFailed { error } => BuildEvent::LaunchFailed {
                project: request.project_name.clone(),
                build_id,
                error: error.clone(),
            },
        };
        self.events.handle_event(event).await;
        outcome
    }

    /// Runs the external process and classifies its result.
    ///
    /// The spec file guard lives across every branch of this function, so
    /// the temp file is removed regardless of outcome.
    async fn run_build(&self, request: &BuildRequest, build_id: BuildId) -> BuildOutcome {
        let spec_file = match SpecFile::write(&request.infrastructure_spec) {
            Ok(file) => file,
            Err(error) => return BuildOutcome::LaunchFailed { error: error.to_string() },
        };

        debug!(
            project = %request.project_name,
            %build_id,
            spec_file = %spec_file.path().display(),
            program = %self.config.build_script.display(),
            "launching build process"
        );

        let mut command = Command::new(&self.config.build_script);
        command
            .arg(request.project_name.as_str())
            .arg(spec_file.path())
            .arg(build_id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must take the process
            // down with it.
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                let error =
                    BuildError::launch(self.config.build_script.display().to_string(), source);
                return BuildOutcome::LaunchFailed { error: error.to_string() };
            },
        };

        match tokio::time::timeout(self.config.build_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => BuildOutcome::Succeeded,
            Ok(Ok(output)) => BuildOutcome::Failed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Ok(Err(source)) => {
                let error =
                    BuildError::launch(self.config.build_script.display().to_string(), source);
                BuildOutcome::LaunchFailed { error: error.to_string() }
            },
            Err(_elapsed) => BuildOutcome::TimedOut { timeout: self.config.build_timeout },
        }
    }
}

impl std::fmt::Debug for BuildExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildExecutor").field("config", &self.config).finish_non_exhaustive()
    }
}
