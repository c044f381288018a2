//! Standalone server binary for the live-broadcast recording service.
//!
//! Loads configuration, bootstraps the recorder and records catalog, and
//! serves the HTTP API until a shutdown signal arrives.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use recorder_core::{bootstrap_services, start_server, AppState, Config};
use tokio::signal;

/// Headless live-broadcast recording server.
#[derive(Parser, Debug)]
#[command(name = "recorder-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "EMIREC_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// HTTP bind port (overrides config file and `EMIREC_SERVER_PORTS_HTTP`).
    #[arg(short = 'p', long, env = "EMIREC_BIND_PORT")]
    port: Option<u16>,

    /// HTTP bind host (overrides config file and `EMIREC_SERVER_HOST`).
    #[arg(short = 'H', long, env = "EMIREC_BIND_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("[Main] recorder-server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.ports.http = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    log::info!(
        "[Main] configuration: host={} http_port={}",
        config.server.host,
        config.server.ports.http
    );

    let services = bootstrap_services(&config);
    log::info!("[Main] services bootstrapped");

    let app_state = AppState::builder().from_services(&services).build();

    let host = config.server.host.clone();
    let port = config.server.ports.http;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(app_state, &host, port).await {
            log::error!("[Main] server error: {e}");
        }
    });

    log::info!("[Main] HTTP server started on port {port}");

    shutdown_signal().await;
    log::info!("[Main] shutdown signal received, cleaning up");

    services.shutdown();
    server_handle.abort();

    log::info!("[Main] shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
