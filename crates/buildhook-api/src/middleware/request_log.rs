//! Per-request diagnostic logging.
//!
//! Every inbound request is logged with the caller address, the request
//! line, and the response status. The subscriber supplies the timestamp.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Logs one line per handled request.
///
/// The caller address comes from `ConnectInfo` when the router is served
/// with connect info; requests driven directly in tests have none and
/// log `-` instead.
pub async fn log_request(request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "-".to_string(), |info| info.0.to_string());
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    info!(%client, status = response.status().as_u16(), "{method} {uri}");

    response
}
