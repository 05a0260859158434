//! Signal handling for graceful shutdown

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Setup signal handlers for graceful shutdown.
///
/// The returned receiver completes on the first Ctrl+C (SIGINT) or SIGTERM.
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let sigterm = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    signal_hook::flag::register(signal_hook::consts::SIGTERM, sigterm.clone())
        .context("Failed to register SIGTERM handler")?;

    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C signal: {}", e);
                    return;
                }
            },
            _ = wait_for_flag(sigterm) => info!("SIGTERM signal received"),
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

async fn wait_for_flag(flag: Arc<AtomicBool>) {
    // signal-hook only flips the flag; poll it
    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Wait for the gateway task to drain in-flight requests, up to `shutdown_timeout`
pub async fn graceful_shutdown(gateway_handle: JoinHandle<()>, shutdown_timeout: Duration) -> Result<()> {
    info!("Starting graceful shutdown...");

    match timeout(shutdown_timeout, gateway_handle).await {
        Ok(Ok(())) => {
            info!("PricingGateway stopped gracefully");
        }
        Ok(Err(e)) => {
            error!("PricingGateway task failed: {}", e);
        }
        Err(_) => {
            warn!("PricingGateway did not stop within {:?}, forcing shutdown", shutdown_timeout);
        }
    }

    info!("Graceful shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_waits_for_finished_task() {
        let handle = tokio::spawn(async {});
        assert!(graceful_shutdown(handle, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_gives_up_after_timeout() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let started = std::time::Instant::now();
        assert!(graceful_shutdown(handle, Duration::from_millis(50)).await.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_flag_wakes_waiter() {
        let flag = Arc::new(AtomicBool::new(false));
        let waiter = tokio::spawn(wait_for_flag(flag.clone()));
        flag.store(true, Ordering::Relaxed);
        assert!(timeout(Duration::from_secs(2), waiter).await.is_ok());
    }
}
