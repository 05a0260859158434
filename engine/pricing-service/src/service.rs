//! Service state management and component initialization

use anyhow::{Context, Result};
use pricing_engine::{Clock, InMemoryCatalog, PricingCatalog, PricingOrchestrator, SystemClock};
use pricing_gateway::create_routes;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ServiceConfig;

/// Service state containing all initialized components
pub struct ServiceState {
    /// Service configuration
    pub config: ServiceConfig,

    /// Catalog shared by the orchestrator and the rate feeds
    pub catalog: Arc<InMemoryCatalog>,

    /// Quoting use case
    pub orchestrator: Arc<PricingOrchestrator>,
}

impl ServiceState {
    /// Create a new service state on the wall clock
    pub fn new(config: ServiceConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new service state with an explicit source of "today"
    pub fn with_clock(config: ServiceConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        info!("Initializing service components...");

        info!("Seeding PricingCatalog...");
        let catalog = Arc::new(
            InMemoryCatalog::from_config(&config.pricing.catalog)
                .context("Failed to seed pricing catalog")?,
        );

        info!("Initializing PricingOrchestrator...");
        let shared_catalog: Arc<dyn PricingCatalog> = catalog.clone();
        let orchestrator = Arc::new(
            PricingOrchestrator::from_config(&config.pricing, shared_catalog, clock)
                .context("Failed to create pricing orchestrator")?,
        );

        // Seeded hotels may report signals before their first quote
        for entry in &config.pricing.catalog.base_rates {
            orchestrator.signals().register_hotel(&entry.hotel_id);
        }
        info!("SignalStore tracking {} hotels", orchestrator.signals().hotel_count());

        info!("Service components initialized successfully");
        Ok(Self { config, catalog, orchestrator })
    }

    /// Bind the gateway and serve it on a background task until `shutdown` resolves.
    ///
    /// Returns the bound address (useful when the configured port is 0).
    pub fn start_gateway<F>(&self, shutdown: F) -> Result<(SocketAddr, JoinHandle<()>)>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.gateway().server_addr().context("Invalid server address")?;
        let routes = create_routes(self.orchestrator.clone(), self.catalog.clone());

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("PricingGateway listening on http://{}", bound);
        Ok((bound, tokio::spawn(server)))
    }
}
