//! Error types for background build execution.
//!
//! These errors never cross the HTTP boundary: by the time any of them
//! can occur, the caller already holds a 202 acknowledgment. They exist
//! to classify outcomes for event reporting and for direct users of the
//! executor in tests.

use thiserror::Error;

/// Result type alias for build execution operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while executing a background build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The infrastructure spec could not be written to a temp file.
    #[error("failed to write infrastructure spec file: {source}")]
    SpecFile {
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The external build executable could not be started.
    #[error("failed to launch build process {program}: {source}")]
    Launch {
        /// Program that could not be launched.
        program: String,
        /// Underlying I/O failure (missing file, permissions, ...).
        #[source]
        source: std::io::Error,
    },

    /// The external build process exceeded its deadline.
    #[error("build timed out after {timeout_seconds}s")]
    Timeout {
        /// The deadline that was exceeded, in seconds.
        timeout_seconds: u64,
    },
}

impl BuildError {
    /// Creates a spec-file error from an I/O failure.
    pub fn spec_file(source: std::io::Error) -> Self {
        Self::SpecFile { source }
    }

    /// Creates a launch error for the given program.
    pub fn launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch { program: program.into(), source }
    }

    /// Creates a timeout error.
    pub const fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }
}
