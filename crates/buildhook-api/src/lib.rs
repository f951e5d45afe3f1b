//! Buildhook HTTP API.
//!
//! The front door of the service: routes build requests to the
//! dispatcher, serves health and status introspection, and converts
//! every per-request fault into an HTTP error response instead of a
//! process fault.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Instant};

use buildhook_core::{BuildEventHandler, BuildIdGenerator, Clock};
use buildhook_runner::BuildExecutor;

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared state handed to every request handler.
///
/// Holds only injected collaborators and the process start instant; no
/// request-visible state lives in memory between requests.
#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<Config>,
    pub(crate) ids: Arc<BuildIdGenerator>,
    pub(crate) executor: Arc<BuildExecutor>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) started_at: Instant,
}

impl AppState {
    /// Creates application state from configuration and injected
    /// dependencies.
    pub fn new(
        config: Arc<Config>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn BuildEventHandler>,
    ) -> Self {
        let ids = Arc::new(BuildIdGenerator::new(clock.clone()));
        let executor = Arc::new(BuildExecutor::new(config.to_runner_config(), events));
        let started_at = clock.now();
        Self { config, ids, executor, clock, started_at }
    }

    /// Service configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seconds since the service started.
    pub fn uptime_seconds(&self) -> f64 {
        self.clock.now().saturating_duration_since(self.started_at).as_secs_f64()
    }
}
