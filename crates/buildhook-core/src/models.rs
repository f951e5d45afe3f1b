//! Build request model and strongly-typed identifiers.
//!
//! A build request is immutable once accepted and owned solely by the
//! background task created for it. Validation happens at construction so
//! the rest of the system only ever sees well-formed values.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, Result};

/// A validated project name.
///
/// Only ASCII alphanumerics, hyphens, and underscores are accepted. The
/// name ends up in a filesystem path and as an argument to the external
/// build process, so anything looser would open path traversal and
/// argument injection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectName(String);

impl ProjectName {
    /// Validates and wraps a project name.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for an empty name and `InvalidProjectName`
    /// for any character outside `[A-Za-z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::missing_field("project_name"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(CoreError::InvalidProjectName { name });
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed build identifier.
///
/// A strictly increasing integer derived from a monotonic time source at
/// request-acceptance instant (see [`crate::ids::BuildIdGenerator`]).
/// Rendered as a numeric string on the wire and in log-file names; never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildId(pub u64);

impl BuildId {
    /// Returns the raw identifier value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An accepted request to build a named project from an infrastructure
/// specification.
///
/// The specification is treated as an opaque JSON object and forwarded
/// verbatim to the external build process.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Validated project name.
    pub project_name: ProjectName,
    /// Opaque, non-empty infrastructure specification.
    pub infrastructure_spec: Value,
}

impl BuildRequest {
    /// Parses and validates a raw request body.
    ///
    /// # Errors
    ///
    /// - `InvalidJson` if the body does not parse.
    /// - `MissingField` if `project_name` is absent, empty, or not a
    ///   string, or if `infrastructure_spec` is absent, not an object, or
    ///   an empty object.
    /// - `InvalidProjectName` on a charset violation.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|_| CoreError::InvalidJson)?;

        let project_name = value
            .get("project_name")
            .and_then(Value::as_str)
            .ok_or(CoreError::missing_field("project_name"))?;
        let project_name = ProjectName::new(project_name)?;

        let infrastructure_spec = value
            .get("infrastructure_spec")
            .and_then(Value::as_object)
            .filter(|spec| !spec.is_empty())
            .ok_or(CoreError::missing_field("infrastructure_spec"))?;

        Ok(Self {
            project_name,
            infrastructure_spec: Value::Object(infrastructure_spec.clone()),
        })
    }
}

/// Returns the conventional log-file name for a build.
///
/// The external build process is expected, but never verified, to write
/// its log at `<logs_dir>/build-<project_name>-<build_id>.log`.
pub fn log_file_name(project: &ProjectName, build_id: BuildId) -> String {
    format!("build-{project}-{build_id}.log")
}
