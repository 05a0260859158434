//! Pricing Orchestrator - composes catalog, signals, demand and rules into a quote

use crate::catalog::PricingCatalog;
use crate::config::PricingConfig;
use crate::demand::{DemandForecaster, DemandInputs, HeuristicForecaster};
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::rules::{PricingContext, RuleEngine};
use crate::signals::{SignalStore, OCCUPANCY};
use crate::types::{round_cents, PriceQuote, PriceQuoteRequest, QuoteParams};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Source of "today" for lead-time calculations
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to one date, for reproducible quotes
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Top-level quoting use case
pub struct PricingOrchestrator {
    catalog: Arc<dyn PricingCatalog>,
    signals: Arc<SignalStore>,
    forecaster: Arc<dyn DemandForecaster>,
    rule_engine: RuleEngine,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsCollector>,
}

impl PricingOrchestrator {
    /// Assemble from parts. `metrics` must be the collector `signals` and `rule_engine`
    /// report to, otherwise ingest and rule-fault counts never reach [`Self::metrics`].
    pub fn new(
        catalog: Arc<dyn PricingCatalog>,
        signals: Arc<SignalStore>,
        forecaster: Arc<dyn DemandForecaster>,
        rule_engine: RuleEngine,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self { catalog, signals, forecaster, rule_engine, clock, metrics }
    }

    /// Wire a signal store, heuristic forecaster and rule chain from configuration around a
    /// caller-supplied catalog. All components share one metrics collector.
    pub fn from_config(
        config: &PricingConfig,
        catalog: Arc<dyn PricingCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(MetricsCollector::new());
        let signals = Arc::new(SignalStore::with_metrics(config.signals.clone(), metrics.clone()));
        let forecaster = Arc::new(HeuristicForecaster::new(config.demand.clone()));
        let rule_engine = RuleEngine::from_config(&config.rules)?.with_metrics(metrics.clone());

        info!(
            "Pricing orchestrator ready: {} rules, floor {} of base, forecaster {}",
            rule_engine.rule_names().len(),
            config.rules.min_price_fraction,
            forecaster.name()
        );

        Ok(Self::new(catalog, signals, forecaster, rule_engine, clock, metrics))
    }

    pub fn signals(&self) -> &Arc<SignalStore> {
        &self.signals
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn rule_engine(&self) -> &RuleEngine {
        &self.rule_engine
    }

    /// Validate raw parameters and quote them
    pub fn quote(&self, params: &QuoteParams) -> Result<PriceQuote> {
        let request = params.validate().map_err(|e| {
            self.metrics.quote_failures_total.inc();
            debug!("Rejected quote parameters: {}", e);
            e
        })?;
        self.quote_request(&request)
    }

    /// Quote an already validated request
    pub fn quote_request(&self, request: &PriceQuoteRequest) -> Result<PriceQuote> {
        let start = Instant::now();
        let result = self.compute_quote(request);
        self.metrics.quote_latency_us.record(start.elapsed().as_micros() as u64);

        match &result {
            Ok(_) => self.metrics.quotes_total.inc(),
            Err(e) => {
                self.metrics.quote_failures_total.inc();
                debug!("Quote failed for {}/{}: {}", request.hotel_id, request.room_type, e);
            }
        }
        result
    }

    fn compute_quote(&self, request: &PriceQuoteRequest) -> Result<PriceQuote> {
        // Catalog first: an unknown hotel or room type fails before any rule runs
        let base_price = self.catalog.base_price(&request.hotel_id, &request.room_type)?;

        // One copy of the signals; no lock is held past this point
        let snapshot = self.signals.read(&request.hotel_id);

        let inputs = DemandInputs::from_snapshot(&snapshot, request, self.clock.today());
        let demand_index = self.forecaster.forecast(&inputs);

        let ctx = PricingContext {
            request: request.clone(),
            demand_index,
            occupancy: inputs.occupancy,
            lead_time_days: inputs.lead_time_days,
            base_price,
            competitor_price: self.catalog.competitor_price(&request.hotel_id, &request.room_type),
            season_multiplier: self
                .catalog
                .season_multiplier(&request.hotel_id, request.check_in.month()),
        };

        let outcome = self.rule_engine.evaluate(&ctx, base_price);

        info!(
            "Quoted {}/{} ({}) for {}: occupancy {:.2}{}, demand {:.3}, base {:.2} -> final {:.2}",
            request.hotel_id,
            request.room_type,
            request.user_segment,
            request.check_in,
            inputs.occupancy,
            if snapshot.is_default() { " (default)" } else { "" },
            demand_index.value(),
            base_price,
            outcome.final_price
        );

        Ok(PriceQuote {
            base_price: round_cents(base_price),
            final_price: outcome.final_price,
            demand_index,
            nights: request.nights,
            total_price: round_cents(outcome.final_price * f64::from(request.nights)),
            applied_rules: outcome.applied_rules,
            audit_trail: outcome.audit_trail,
            forecaster: self.forecaster.name().to_string(),
        })
    }

    /// Feed an occupancy reading into the signal store
    pub fn ingest_occupancy(&self, hotel_id: &str, value: f64, observed_at: DateTime<Utc>) -> Result<()> {
        self.signals.ingest(hotel_id, OCCUPANCY, value, observed_at)
    }
}
