//! Dynamic Pricing Engine
//!
//! Turns a hotel, room type, stay date and caller segment into an explainable price.
//! Live demand signals (occupancy) are held in the [`SignalStore`], condensed into a
//! [`DemandIndex`] by a [`DemandForecaster`], and fed through an ordered chain of
//! [`PricingRule`]s by the [`RuleEngine`]. The [`PricingOrchestrator`] ties these together
//! and returns a [`PriceQuote`] carrying the applied rules and a full audit trail.

pub mod catalog;
pub mod config;
pub mod demand;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod rules;
pub mod signals;
pub mod types;


pub use catalog::{CatalogError, InMemoryCatalog, PricingCatalog};
pub use config::PricingConfig;
pub use demand::{DemandForecaster, DemandInputs, HeuristicForecaster};
pub use error::{PricingError, Result};
pub use metrics::{MetricsCollector, PricingMetrics};
pub use orchestrator::{Clock, FixedClock, PricingOrchestrator, SystemClock};
pub use rules::{PricingContext, PricingRule, RuleEngine, RuleOutcome, RuleSpec};
pub use signals::{SignalReading, SignalSnapshot, SignalStore, OCCUPANCY};
pub use types::{
    Adjustment, AdjustmentKind, AppliedRule, DemandIndex, PriceQuote, PriceQuoteRequest,
    QuoteParams, UserSegment,
};

/// Occupancy assumed for hotels that have never reported one
pub const DEFAULT_OCCUPANCY: f64 = 0.5;

/// Default lower bound on the final price, as a fraction of the base price
pub const DEFAULT_MIN_PRICE_FRACTION: f64 = 0.5;
