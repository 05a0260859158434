//! Dynamic Pricing Production Service
//!
//! Entry point for the `dynamic-pricing` binary. Loads configuration, wires the pricing
//! components, serves the HTTP gateway and shuts down gracefully on Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;

use pricing_service::{
    graceful_shutdown, initialize_logging, load_configuration, setup_signal_handlers, ServiceState,
};

#[derive(Parser)]
#[command(name = "dynamic-pricing")]
#[command(about = "Dynamic Pricing Engine HTTP service")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file (overrides PRICING_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file and PRICING_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Initialize logging before anything else reports
    initialize_logging(&config.logging)?;

    info!("Starting Dynamic Pricing Service v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded successfully");

    let service_state = ServiceState::new(config).context("Failed to initialize service")?;
    info!("Service state initialized");

    let shutdown_signal = setup_signal_handlers()?;
    info!("Signal handlers configured");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (_, gateway_handle) = service_state.start_gateway(async move {
        let _ = stop_rx.await;
    })?;

    // Wait for shutdown signal
    info!("Dynamic Pricing Service is running. Press Ctrl+C to shutdown gracefully.");
    let _ = shutdown_signal.await;

    info!("Shutdown signal received. Draining in-flight requests...");
    let _ = stop_tx.send(());
    let shutdown_timeout = Duration::from_secs(service_state.config.server.shutdown_timeout_secs);
    graceful_shutdown(gateway_handle, shutdown_timeout).await?;

    info!("Dynamic Pricing Service shutdown complete");
    Ok(())
}
