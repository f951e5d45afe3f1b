//! Core domain types for the buildhook service.
//!
//! Provides the build request model, validated project names, monotonic
//! build identifiers, the error taxonomy for request validation, and the
//! event-handler abstraction through which background builds report their
//! outcomes. All other crates depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod ids;
pub mod models;
pub mod time;

pub use error::{CoreError, Result};
pub use events::{BuildEvent, BuildEventHandler, NoOpEventHandler, TracingEventHandler};
pub use ids::BuildIdGenerator;
pub use models::{log_file_name, BuildId, BuildRequest, ProjectName};
pub use time::{Clock, RealClock, TestClock};
