//! Test infrastructure for the buildhook service.
//!
//! Provides a self-contained test environment: a temp directory tree
//! with the three required directories, stub generator and build
//! scripts, a configuration wired to them, and a recording event handler
//! for observing background build outcomes. Everything is removed when
//! the environment drops.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::Router;
use buildhook_api::{create_router, AppState, Config};
use buildhook_core::{BuildEvent, BuildEventHandler, Clock};
use buildhook_runner::RunnerConfig;
use tempfile::TempDir;

pub use buildhook_core::TestClock;

/// Self-contained environment for integration tests.
///
/// Lays out `projects/`, `logs/`, and `scripts/` under a temp root,
/// provisions a generator-script stub and a succeeding build-script
/// stub, and builds a [`Config`] pointing at all of them.
pub struct TestEnv {
    root: TempDir,
    config: Config,
    clock: Arc<TestClock>,
    events: Arc<RecordingEventHandler>,
}

impl TestEnv {
    /// Creates a fresh environment with a succeeding build script.
    ///
    /// The default build script writes the conventional
    /// `build-<project>-<id>.log` file into the logs directory and exits
    /// zero, mimicking a well-behaved external build process.
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("creating test environment root")?;

        let projects_dir = root.path().join("projects");
        let logs_dir = root.path().join("logs");
        let scripts_dir = root.path().join("scripts");
        for dir in [&projects_dir, &logs_dir, &scripts_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let generator_script = scripts_dir.join("generate-terraform.sh");
        write_script(&generator_script, "#!/bin/sh\nexit 0\n")?;

        let build_script = root.path().join("build-and-upload.sh");
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8081,
            projects_dir,
            logs_dir,
            scripts_dir,
            generator_script,
            build_script,
            build_timeout_seconds: 300,
            ..Config::default()
        };

        let env = Self {
            root,
            config,
            clock: Arc::new(TestClock::new()),
            events: Arc::new(RecordingEventHandler::new()),
        };
        env.use_succeeding_build_script()?;
        Ok(env)
    }

    /// Configuration wired to this environment's paths.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The environment's controllable clock.
    pub fn clock(&self) -> Arc<TestClock> {
        Arc::clone(&self.clock)
    }

    /// The recording handler receiving background build events.
    pub fn events(&self) -> Arc<RecordingEventHandler> {
        Arc::clone(&self.events)
    }

    /// Logs directory of this environment.
    pub fn logs_dir(&self) -> &Path {
        &self.config.logs_dir
    }

    /// Builds the full application router over this environment.
    pub fn app(&self) -> Router {
        let clock: Arc<dyn Clock> = self.clock.clone();
        let events: Arc<dyn BuildEventHandler> = self.events.clone();
        let state = AppState::new(Arc::new(self.config.clone()), clock, events);
        create_router(state)
    }

    /// Runner configuration for driving the executor directly.
    pub fn runner_config(&self) -> RunnerConfig {
        self.config.to_runner_config()
    }

    /// Runner configuration with a shortened build deadline.
    pub fn runner_config_with_timeout(&self, timeout: Duration) -> RunnerConfig {
        RunnerConfig { build_timeout: timeout, ..self.runner_config() }
    }

    /// Seeds a file into the logs directory.
    pub fn write_build_log(&self, filename: &str, contents: &str) -> Result<()> {
        let path = self.config.logs_dir.join(filename);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
    }

    /// Installs a build script that writes its log file and exits zero.
    pub fn use_succeeding_build_script(&self) -> Result<()> {
        let body = format!(
            "#!/bin/sh\necho \"built $1 from $2\" > \"{}/build-$1-$3.log\"\nexit 0\n",
            self.config.logs_dir.display()
        );
        write_script(&self.config.build_script, &body)
    }

    /// Installs a build script that prints to stderr and exits non-zero.
    pub fn use_failing_build_script(&self, stderr_message: &str) -> Result<()> {
        let body = format!("#!/bin/sh\necho \"{stderr_message}\" >&2\nexit 1\n");
        write_script(&self.config.build_script, &body)
    }

    /// Installs a build script that sleeps past any short test deadline.
    pub fn use_hanging_build_script(&self, seconds: u64) -> Result<()> {
        let body = format!("#!/bin/sh\nsleep {seconds}\nexit 0\n");
        write_script(&self.config.build_script, &body)
    }

    /// Installs a build script that records its spec-file argument, then
    /// exits zero. Returns the path the argument is recorded to.
    pub fn use_capturing_build_script(&self) -> Result<PathBuf> {
        let capture = self.root.path().join("captured-args");
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n%s\\n%s\\n' \"$1\" \"$2\" \"$3\" > \"{}\"\nexit 0\n",
            capture.display()
        );
        write_script(&self.config.build_script, &body)?;
        Ok(capture)
    }

    /// Removes the build script so launches fail.
    pub fn remove_build_script(&self) -> Result<()> {
        fs::remove_file(&self.config.build_script)
            .with_context(|| format!("removing {}", self.config.build_script.display()))
    }
}

fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body).with_context(|| format!("writing script {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("marking {} executable", path.display()))?;
    }
    Ok(())
}

/// Event handler that records every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingEventHandler {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Waits until at least one event has arrived, polling up to the
    /// deadline. Returns the first event, or `None` on expiry.
    pub async fn wait_for_terminal_event(&self, deadline: Duration) -> Option<BuildEvent> {
        let poll = Duration::from_millis(10);
        let mut waited = Duration::ZERO;
        loop {
            if let Some(event) = self.events().into_iter().next() {
                return Some(event);
            }
            if waited >= deadline {
                return None;
            }
            tokio::time::sleep(poll).await;
            waited += poll;
        }
    }
}

#[async_trait::async_trait]
impl BuildEventHandler for RecordingEventHandler {
    async fn handle_event(&self, event: BuildEvent) {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(event);
    }
}
