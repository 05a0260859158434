//! Dynamic Pricing Production Service Library
//!
//! Configuration loading, logging setup, component wiring and graceful shutdown for the
//! `dynamic-pricing` binary.

use anyhow::{Context, Result};
use std::path::Path;

pub mod config;
pub mod logging;
pub mod service;
pub mod signals;

pub use config::{LoggingConfig, ServiceConfig};
pub use logging::initialize_logging;
pub use service::ServiceState;
pub use signals::{graceful_shutdown, setup_signal_handlers};

/// Load configuration from an optional file and environment variables
pub fn load_configuration(config_file: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(config_file).context("Failed to load service configuration")
}
