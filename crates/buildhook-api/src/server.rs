//! HTTP server setup.

use std::net::SocketAddr;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{handlers, middleware, AppState};

/// Creates the Axum router with all routes.
///
/// Anything outside the three routes falls through to the 404 handler
/// that lists the valid endpoints.
pub fn create_router(state: AppState) -> Router {
    // Method fallbacks keep the contract uniform: a wrong method on a
    // known path gets the same 404 endpoint listing as an unknown path,
    // not a bare 405.
    Router::new()
        .route(
            "/build-project",
            post(handlers::dispatch_build).fallback(handlers::unknown_endpoint),
        )
        .route("/health", get(handlers::health_check).fallback(handlers::unknown_endpoint))
        .route("/status", get(handlers::build_status).fallback(handlers::unknown_endpoint))
        .fallback(handlers::unknown_endpoint)
        .layer(axum_middleware::from_fn(middleware::log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server and runs it to completion.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "buildhook listening");
    info!("POST /build-project - build a project from a JSON infrastructure spec");
    info!("GET  /health        - health check");
    info!("GET  /status        - recent builds status");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}
