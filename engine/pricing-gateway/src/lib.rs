//! PricingGateway - HTTP API for the Dynamic Pricing Engine
//!
//! Exposes price quotes and the demand/rate feeds over warp routes, maps engine errors to
//! HTTP status codes and renders them in a uniform JSON error body.

pub mod config;
pub mod error;
pub mod rest_api;

pub use config::{GatewayConfig, ServerConfig};
pub use error::{GatewayError, GatewayResult};
pub use rest_api::create_routes;

/// Version of the PricingGateway API
pub const VERSION: &str = "0.1.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;
