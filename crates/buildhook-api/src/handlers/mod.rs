//! HTTP request handlers for the buildhook API.
//!
//! Handlers follow a consistent pattern:
//! - Input validation with field-naming error messages
//! - Tracing for observability
//! - Standardized JSON error responses
//!
//! Every per-request fault is converted to a status + JSON body here; no
//! handler may let an error escape as a process fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use buildhook_core::CoreError;
use serde::Serialize;

pub mod build;
pub mod health;
pub mod status;

// Re-export handlers for convenient access
pub use build::dispatch_build;
pub use health::health_check;
pub use status::build_status;

/// Service name reported by the introspection endpoints.
pub const SERVICE_NAME: &str = "project-builder";

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message.
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable machine-readable error code.
    pub code: &'static str,
    /// Human-readable error description; names the offending field for
    /// validation failures.
    pub message: String,
}

/// Converts a validation error into its HTTP response.
pub fn error_response(error: &CoreError) -> Response {
    let status = if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let body = ErrorResponse {
        error: ErrorDetail { code: error.code(), message: error.to_string() },
    };

    (status, Json(body)).into_response()
}

/// Body of the 404 response, listing what the caller could have asked for.
#[derive(Debug, Serialize)]
struct UnknownEndpointResponse {
    error: ErrorDetail,
    endpoints: [&'static str; 3],
}

/// Fallback handler for any (method, path) outside the routing table.
pub async fn unknown_endpoint() -> Response {
    let body = UnknownEndpointResponse {
        error: ErrorDetail {
            code: "unknown_endpoint",
            message: "Endpoint not found. Available endpoints: /build-project, /health, /status"
                .to_string(),
        },
        endpoints: ["POST /build-project", "GET /health", "GET /status"],
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
