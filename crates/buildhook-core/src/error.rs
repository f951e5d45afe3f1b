//! Error types and result handling for build request validation.
//!
//! Defines the client-facing error taxonomy. The API crate maps these
//! variants to HTTP statuses; this crate stays transport-agnostic.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced while validating an incoming build request.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Request body was not parseable JSON.
    #[error("Invalid JSON in request body")]
    InvalidJson,

    /// A required field was absent, empty, or of the wrong type.
    #[error("Missing {field} parameter")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Project name contained a character outside the allowed charset.
    ///
    /// The name is later interpolated into a filesystem path and an
    /// external-process argument, so the charset is a security boundary.
    #[error("Invalid project_name. Use only alphanumeric characters, hyphens, and underscores")]
    InvalidProjectName {
        /// The rejected name.
        name: String,
    },

    /// Unexpected internal fault while handling a request.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Creates a missing-field error.
    pub const fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an internal error from a message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns a stable machine-readable code for the error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::MissingField { .. } => "missing_parameter",
            Self::InvalidProjectName { .. } => "invalid_project_name",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns whether the fault lies with the caller's input.
    ///
    /// Client errors map to 400 responses; everything else is a 500.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidJson | Self::MissingField { .. } | Self::InvalidProjectName { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(CoreError::InvalidJson.code(), "invalid_json");
        assert_eq!(CoreError::missing_field("project_name").code(), "missing_parameter");
        assert_eq!(
            CoreError::InvalidProjectName { name: "a b".into() }.code(),
            "invalid_project_name"
        );
        assert_eq!(CoreError::internal("boom").code(), "internal_error");
    }

    #[test]
    fn messages_name_the_offending_field() {
        let err = CoreError::missing_field("infrastructure_spec");
        assert_eq!(err.to_string(), "Missing infrastructure_spec parameter");
    }

    #[test]
    fn client_errors_identified() {
        assert!(CoreError::InvalidJson.is_client_error());
        assert!(CoreError::missing_field("project_name").is_client_error());
        assert!(CoreError::InvalidProjectName { name: "a!".into() }.is_client_error());
        assert!(!CoreError::internal("fault").is_client_error());
    }
}
