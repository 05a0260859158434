//! Configuration for the pricing engine

use crate::error::{PricingError, Result};
use crate::rules::RuleSpec;
use crate::signals::OCCUPANCY;
use crate::types::UserSegment;
use crate::{DEFAULT_MIN_PRICE_FRACTION, DEFAULT_OCCUPANCY};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level configuration for the pricing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PricingConfig {
    /// Signal Store configuration
    pub signals: SignalConfig,

    /// Demand index weighting
    pub demand: DemandConfig,

    /// Ordered rule chain and price floor
    pub rules: RulesConfig,

    /// Seed data for the in-memory pricing catalog
    pub catalog: CatalogConfig,
}

/// Inclusive valid range for a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRange {
    pub min: f64,
    pub max: f64,
}

/// Signal Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Occupancy assumed when a hotel has never reported one
    pub default_occupancy: f64,

    /// Reject ingestion for hotels that were not registered first
    pub require_registered_hotels: bool,

    /// Declared signals and their valid ranges
    pub ranges: BTreeMap<String, SignalRange>,
}

/// Demand index weighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    /// Weight of the occupancy factor (dominant)
    pub occupancy_weight: f64,

    /// Weight of the lead-time factor
    pub lead_time_weight: f64,

    /// Weight of the day-of-week factor
    pub day_of_week_weight: f64,

    /// Days over which lead-time urgency decays by a factor of e
    pub lead_time_decay_days: f64,

    /// Check-in weekdays treated as peak
    pub peak_weekdays: Vec<Weekday>,
}

/// Rule chain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rules in evaluation order
    pub chain: Vec<RuleSpec>,

    /// Final price never drops below this fraction of the base price
    pub min_price_fraction: f64,
}

/// A (hotel, room type) price entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub hotel_id: String,
    pub room_type: String,
    pub price: f64,
}

/// A (hotel, month) seasonal multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonEntry {
    pub hotel_id: String,
    /// Calendar month, 1-12
    pub month: u32,
    pub multiplier: f64,
}

/// Catalog seed data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_rates: Vec<RateEntry>,
    pub competitor_prices: Vec<RateEntry>,
    pub season_multipliers: Vec<SeasonEntry>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        let mut ranges = BTreeMap::new();
        ranges.insert(OCCUPANCY.to_string(), SignalRange { min: 0.0, max: 1.0 });

        Self { default_occupancy: DEFAULT_OCCUPANCY, require_registered_hotels: false, ranges }
    }
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            occupancy_weight: 0.6,
            lead_time_weight: 0.3,
            day_of_week_weight: 0.1,
            lead_time_decay_days: 21.0,
            peak_weekdays: vec![Weekday::Fri, Weekday::Sat],
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self { chain: default_chain(), min_price_fraction: DEFAULT_MIN_PRICE_FRACTION }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let rate = |hotel_id: &str, room_type: &str, price: f64| RateEntry {
            hotel_id: hotel_id.to_string(),
            room_type: room_type.to_string(),
            price,
        };

        Self {
            base_rates: vec![
                rate("H1", "DLX", 5000.0),
                rate("H1", "STD", 3000.0),
                rate("123", "deluxe", 250.0),
                rate("123", "standard", 180.0),
            ],
            competitor_prices: Vec::new(),
            season_multipliers: vec![
                SeasonEntry { hotel_id: "H1".to_string(), month: 12, multiplier: 1.30 }, // peak
                SeasonEntry { hotel_id: "H1".to_string(), month: 1, multiplier: 0.90 },  // low
            ],
        }
    }
}

/// The default rule chain, in evaluation order
pub fn default_chain() -> Vec<RuleSpec> {
    let mut segments = BTreeMap::new();
    for (segment, pct) in [
        (UserSegment::Loyal, -0.05),
        (UserSegment::Silver, -0.03),
        (UserSegment::Gold, -0.07),
        (UserSegment::Platinum, -0.12),
        (UserSegment::Corporate, -0.08),
        (UserSegment::Vip, 0.10),
    ] {
        segments.insert(segment.as_str().to_string(), pct);
    }

    vec![
        RuleSpec::SeasonalMultiplier { name: "SeasonalMultiplier".to_string() },
        RuleSpec::OccupancySurge {
            name: "OccupancySurge".to_string(),
            threshold: 0.85,
            base_uplift: 0.10,
            slope: 1.0,
        },
        RuleSpec::HighDemandSurge {
            name: "HighDemandSurge".to_string(),
            demand_threshold: 0.80,
            multiplier: 1.10,
        },
        RuleSpec::CompetitorAlign {
            name: "CompetitorAlign".to_string(),
            undercut_pct: 0.03,
            trigger_pct: 0.95,
        },
        RuleSpec::LastMinuteSurcharge {
            name: "LastMinuteSurcharge".to_string(),
            max_days: 3,
            min_demand: 0.70,
            surcharge_pct: 0.08,
        },
        RuleSpec::LastMinuteDeal {
            name: "LastMinuteDeal".to_string(),
            max_days: 3,
            max_occupancy: 0.40,
            discount_pct: 0.20,
        },
        RuleSpec::SegmentAdjustment { name: "SegmentAdjustment".to_string(), adjustments: segments },
        RuleSpec::PriceCap { name: "MaximumPriceCap".to_string(), max_multiple: 3.0 },
    ]
}

impl PricingConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PricingConfig =
            toml::from_str(content).map_err(|e| PricingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let signals = &self.signals;
        if !(0.0..=1.0).contains(&signals.default_occupancy) {
            return Err(PricingError::Config(format!(
                "default_occupancy must be in [0, 1], got {}",
                signals.default_occupancy
            )));
        }
        for (name, range) in &signals.ranges {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(PricingError::Config(format!("invalid range for signal '{}'", name)));
            }
        }

        let demand = &self.demand;
        let weights = [demand.occupancy_weight, demand.lead_time_weight, demand.day_of_week_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PricingError::Config("demand weights must be non-negative".to_string()));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(PricingError::Config(format!("demand weights must sum to 1, got {}", total)));
        }
        if demand.occupancy_weight < demand.lead_time_weight
            || demand.occupancy_weight < demand.day_of_week_weight
        {
            return Err(PricingError::Config("occupancy must carry the largest demand weight".to_string()));
        }
        if demand.lead_time_decay_days.is_nan() || demand.lead_time_decay_days <= 0.0 {
            return Err(PricingError::Config("lead_time_decay_days must be positive".to_string()));
        }

        let fraction = self.rules.min_price_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(PricingError::Config(format!(
                "min_price_fraction must be in [0, 1], got {}",
                fraction
            )));
        }
        for spec in &self.rules.chain {
            spec.validate()?;
        }

        let catalog = &self.catalog;
        for entry in catalog.base_rates.iter().chain(catalog.competitor_prices.iter()) {
            if !(entry.price.is_finite() && entry.price > 0.0) {
                return Err(PricingError::Config(format!(
                    "price for {}/{} must be positive",
                    entry.hotel_id, entry.room_type
                )));
            }
        }
        for entry in &catalog.season_multipliers {
            if !(1..=12).contains(&entry.month) || !(entry.multiplier.is_finite() && entry.multiplier > 0.0) {
                return Err(PricingError::Config(format!(
                    "invalid season multiplier for {} month {}",
                    entry.hotel_id, entry.month
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signals.default_occupancy, DEFAULT_OCCUPANCY);
        assert_eq!(config.rules.min_price_fraction, DEFAULT_MIN_PRICE_FRACTION);
        assert_eq!(config.rules.chain.len(), 8);
        assert_eq!(config.signals.ranges.get(OCCUPANCY), Some(&SignalRange { min: 0.0, max: 1.0 }));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PricingConfig::from_toml_str(
            r#"
            [signals]
            default_occupancy = 0.6

            [rules]
            min_price_fraction = 0.7
            "#,
        )
        .unwrap();
        assert_eq!(config.signals.default_occupancy, 0.6);
        assert_eq!(config.rules.min_price_fraction, 0.7);
        assert_eq!(config.rules.chain, default_chain());
        assert_eq!(config.demand, DemandConfig::default());
    }

    #[test]
    fn test_toml_rule_chain() {
        let config = PricingConfig::from_toml_str(
            r#"
            [rules]
            min_price_fraction = 0.5

            [[rules.chain]]
            type = "early_bird_discount"
            name = "EarlyBird"
            min_days = 60
            discount_pct = 0.10

            [[rules.chain]]
            type = "segment_adjustment"
            name = "Segments"
            adjustments = { loyal = -0.05, vip = 0.10 }

            [[catalog.base_rates]]
            hotel_id = "H7"
            room_type = "suite"
            price = 900.0
            "#,
        )
        .unwrap();

        assert_eq!(config.rules.chain.len(), 2);
        assert_eq!(config.rules.chain[0].name(), "EarlyBird");
        assert_eq!(config.catalog.base_rates.len(), 1);
        assert_eq!(config.catalog.base_rates[0].hotel_id, "H7");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = PricingConfig::default();
        config.demand.occupancy_weight = 0.9;
        assert!(matches!(config.validate(), Err(PricingError::Config(_))));

        let mut config = PricingConfig::default();
        config.rules.min_price_fraction = 1.5;
        assert!(config.validate().is_err());

        let mut config = PricingConfig::default();
        config.signals.default_occupancy = -0.1;
        assert!(config.validate().is_err());

        let mut config = PricingConfig::default();
        config.catalog.season_multipliers[0].month = 13;
        assert!(config.validate().is_err());

        let mut config = PricingConfig::default();
        config.demand = DemandConfig {
            occupancy_weight: 0.2,
            lead_time_weight: 0.7,
            day_of_week_weight: 0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(PricingConfig::from_toml_str("[rules]\nmin_price_fraction = \"high\"").is_err());
    }
}
