//! Service configuration management

use anyhow::{anyhow, Context, Result};
use pricing_engine::PricingConfig;
use pricing_gateway::{GatewayConfig, ServerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV: &str = "PRICING_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Pricing engine configuration: signals, demand weights, rule chain, catalog seed
    pub pricing: PricingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full EnvFilter directive
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServiceConfig {
    /// Gateway view of the server section
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig { server: self.server.clone() }
    }
}

/// Load configuration: defaults, then an optional TOML file, then environment overrides.
///
/// The file comes from `config_file` when given, otherwise from `PRICING_CONFIG`.
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    let path = config_file
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(&path)?
        }
        None => ServiceConfig::default(),
    };

    load_from_env(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file; missing sections fall back to defaults
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Load configuration from environment variables
fn load_from_env(config: &mut ServiceConfig) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply `PRICING_*` overrides looked up through `lookup`
pub fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("PRICING_HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("PRICING_PORT") {
        config.server.port =
            port.parse().with_context(|| format!("Invalid PRICING_PORT: {}", port))?;
    }

    if let Some(level) = lookup("PRICING_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("PRICING_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(fraction) = lookup("PRICING_MIN_PRICE_FRACTION") {
        config.pricing.rules.min_price_fraction = fraction
            .parse()
            .with_context(|| format!("Invalid PRICING_MIN_PRICE_FRACTION: {}", fraction))?;
    }

    if let Some(occupancy) = lookup("PRICING_DEFAULT_OCCUPANCY") {
        config.pricing.signals.default_occupancy = occupancy
            .parse()
            .with_context(|| format!("Invalid PRICING_DEFAULT_OCCUPANCY: {}", occupancy))?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    config
        .gateway()
        .server_addr()
        .with_context(|| format!("Invalid server address: {}:{}", config.server.host, config.server.port))?;

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.logging.level.trim().is_empty() {
        return Err(anyhow!("Log level must not be empty"));
    }

    config.pricing.validate().context("Invalid pricing configuration")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.pricing.rules.min_price_fraction, 0.5);
    }

    #[test]
    fn test_load_from_file_with_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[logging]
format = "json"

[pricing.rules]
min_price_fraction = 0.6
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.pricing.rules.min_price_fraction, 0.6);
        // Untouched sections keep their defaults
        assert!(!config.pricing.rules.chain.is_empty());
        assert!(!config.pricing.catalog.base_rates.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_from_file(&missing).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        apply_overrides(
            &mut config,
            env(&[
                ("PRICING_HOST", "127.0.0.1"),
                ("PRICING_PORT", "9000"),
                ("PRICING_LOG_LEVEL", "debug"),
                ("PRICING_LOG_FORMAT", "compact"),
                ("PRICING_MIN_PRICE_FRACTION", "0.7"),
                ("PRICING_DEFAULT_OCCUPANCY", "0.4"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "compact");
        assert_eq!(config.pricing.rules.min_price_fraction, 0.7);
        assert_eq!(config.pricing.signals.default_occupancy, 0.4);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unparsable_env_override_is_an_error() {
        let mut config = ServiceConfig::default();
        assert!(apply_overrides(&mut config, env(&[("PRICING_PORT", "eighty")])).is_err());
        assert!(apply_overrides(&mut config, env(&[("PRICING_MIN_PRICE_FRACTION", "half")])).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ServiceConfig::default();
        config.logging.format = "xml".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = ServiceConfig::default();
        config.pricing.rules.min_price_fraction = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = ServiceConfig::default();
        config.server.host = "not a host".to_string();
        assert!(validate_config(&config).is_err());
    }
}
