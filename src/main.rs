//! Buildhook webhook build service.
//!
//! Main entry point for the server. Loads configuration, initializes
//! tracing, starts the HTTP front door, and coordinates graceful
//! shutdown. Accepted builds keep running as detached tasks until their
//! own deadline; shutdown only stops the listener.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use buildhook_api::{start_server, AppState, Config};
use buildhook_core::{RealClock, TracingEventHandler};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from defaults, config.toml, and environment
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting project-builder webhook service");
    info!(
        port = config.port,
        logs_dir = %config.logs_dir.display(),
        build_script = %config.build_script.display(),
        build_timeout_seconds = config.build_timeout_seconds,
        "Configuration loaded"
    );

    let addr = config.parse_server_addr()?;
    let state = AppState::new(
        Arc::new(config),
        Arc::new(RealClock::new()),
        Arc::new(TracingEventHandler::new()),
    );

    // Start HTTP server
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state, addr).await {
            error!(error = %e, "Server failed");
        }
    });

    info!(%addr, "Ready to accept build requests");

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received, starting graceful shutdown");

    // Give in-flight requests time to complete
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(30)) => {
            info!("Shutdown grace period expired");
        }
        _ = server_handle => {
            info!("Server stopped");
        }
    }

    info!("Buildhook shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
