//! erpgate - HTTP gateway in front of the Service Layer.
//!
//! Validates business partner, item and sales order creation requests and
//! forwards them through a single shared Service Layer session.

mod routes;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use erpgate_core::gateway::SalesOrderSettings;
use erpgate_core::{Config, SessionClient};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use routes::AppState;

// ============================================================================
// Constants
// ============================================================================

/// Directory for rolling log files; stderr only when unset
const LOG_DIR_ENV: &str = "ERPGATE_LOG_DIR";

const LOG_FILE_PREFIX: &str = "erpgate.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.service_layer.base_url,
        company = %config.service_layer.company_db,
        "erpgate starting"
    );

    let client = SessionClient::from_config(&config.service_layer)
        .context("Failed to create Service Layer client")?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        Arc::new(client),
        SalesOrderSettings {
            default_warehouse_code: config.service_layer.default_warehouse_code.clone(),
        },
        shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("HTTP server failed")?;

    info!("erpgate shutting down");
    Ok(())
}

/// Resolve on Ctrl-C, cancelling in-flight Service Layer calls first.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    shutdown.cancel();
}
