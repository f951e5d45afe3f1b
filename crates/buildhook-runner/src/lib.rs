//! Background build execution with bounded deadlines.
//!
//! This crate implements the fire-and-forget side of the service: each
//! accepted build request becomes one detached task that writes the
//! infrastructure spec to a scoped temp file, invokes the external
//! build-and-upload executable with a deadline, classifies the outcome,
//! and reports it through the injected event handler. Nothing flows back
//! to the HTTP caller.
//!
//! # Execution lifecycle
//!
//! 1. **Spec file** - serialize the infrastructure spec to a temp file
//!    that is removed on every exit path
//! 2. **Launch** - spawn the external executable with
//!    `(project_name, spec_file_path, build_id)` as positional arguments
//! 3. **Deadline** - wait for exit, bounded by the configured timeout;
//!    on expiry the process is killed
//! 4. **Report** - emit exactly one terminal [`BuildEvent`]
//!
//! [`BuildEvent`]: buildhook_core::BuildEvent

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod spec_file;

pub use error::{BuildError, Result};
pub use executor::{BuildExecutor, BuildOutcome, RunnerConfig};
pub use spec_file::SpecFile;

/// Default deadline for a single external build, in seconds.
pub const DEFAULT_BUILD_TIMEOUT_SECONDS: u64 = 300;
