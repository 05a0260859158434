//! Signal Store - latest known demand signals per hotel
//!
//! Each hotel owns one [`SignalSnapshot`]. Ingestion overwrites the reading for a
//! (hotel, signal) pair; nothing is averaged and no history is kept. The backing
//! `DashMap` shards its locks by key, so ingests for different hotels rarely contend while
//! an ingest and a read for the same hotel are serialised. Readers get a cloned snapshot
//! and hold no lock once `read` returns.

use crate::config::{SignalConfig, SignalRange};
use crate::error::{PricingError, Result};
use crate::metrics::MetricsCollector;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the occupancy signal
pub const OCCUPANCY: &str = "occupancy";

/// A single observed signal value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReading {
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

/// Latest readings for one hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSnapshot {
    pub hotel_id: String,
    pub readings: BTreeMap<String, SignalReading>,
    default_occupancy: f64,
}

impl SignalSnapshot {
    /// Snapshot for a hotel that has not reported anything
    pub fn empty(hotel_id: &str, default_occupancy: f64) -> Self {
        Self { hotel_id: hotel_id.to_string(), readings: BTreeMap::new(), default_occupancy }
    }

    pub fn reading(&self, signal: &str) -> Option<&SignalReading> {
        self.readings.get(signal)
    }

    /// Current occupancy, or the configured default when none was reported
    pub fn occupancy(&self) -> f64 {
        self.readings.get(OCCUPANCY).map(|r| r.value).unwrap_or(self.default_occupancy)
    }

    /// True when occupancy comes from the default rather than a feed
    pub fn is_default(&self) -> bool {
        !self.readings.contains_key(OCCUPANCY)
    }
}

/// Process-wide store of demand signals
pub struct SignalStore {
    config: SignalConfig,
    snapshots: DashMap<String, SignalSnapshot>,
    metrics: Arc<MetricsCollector>,
}

impl SignalStore {
    pub fn new(config: SignalConfig) -> Self {
        Self::with_metrics(config, Arc::new(MetricsCollector::new()))
    }

    pub fn with_metrics(config: SignalConfig, metrics: Arc<MetricsCollector>) -> Self {
        Self { config, snapshots: DashMap::new(), metrics }
    }

    /// Pre-register a hotel; required before ingestion when the store demands registration
    pub fn register_hotel(&self, hotel_id: &str) {
        let default_occupancy = self.config.default_occupancy;
        self.snapshots
            .entry(hotel_id.to_string())
            .or_insert_with(|| SignalSnapshot::empty(hotel_id, default_occupancy));
    }

    pub fn is_registered(&self, hotel_id: &str) -> bool {
        self.snapshots.contains_key(hotel_id)
    }

    pub fn hotel_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Declared valid range for a signal
    pub fn range_for(&self, signal: &str) -> Option<SignalRange> {
        self.config.ranges.get(signal).copied()
    }

    /// Record the latest value of a signal for a hotel.
    ///
    /// All validation happens before the store is touched, so a rejected value leaves the
    /// hotel's snapshot exactly as it was.
    pub fn ingest(
        &self,
        hotel_id: &str,
        signal: &str,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<()> {
        if let Err(e) = self.validate(signal, value) {
            self.metrics.signals_rejected_total.inc();
            warn!("Rejected signal {} = {} for hotel {}: {}", signal, value, hotel_id, e);
            return Err(e);
        }

        let reading = SignalReading { value, observed_at };

        if self.config.require_registered_hotels {
            match self.snapshots.get_mut(hotel_id) {
                Some(mut snapshot) => {
                    snapshot.readings.insert(signal.to_string(), reading);
                }
                None => {
                    self.metrics.signals_rejected_total.inc();
                    warn!("Rejected signal {} for unregistered hotel {}", signal, hotel_id);
                    return Err(PricingError::UnknownHotel(hotel_id.to_string()));
                }
            }
        } else {
            let default_occupancy = self.config.default_occupancy;
            self.snapshots
                .entry(hotel_id.to_string())
                .or_insert_with(|| SignalSnapshot::empty(hotel_id, default_occupancy))
                .readings
                .insert(signal.to_string(), reading);
        }

        self.metrics.signals_ingested_total.inc();
        debug!("Ingested signal {} = {} for hotel {}", signal, value, hotel_id);
        Ok(())
    }

    /// Current snapshot for a hotel; never fails
    pub fn read(&self, hotel_id: &str) -> SignalSnapshot {
        match self.snapshots.get(hotel_id) {
            Some(snapshot) => snapshot.value().clone(),
            None => SignalSnapshot::empty(hotel_id, self.config.default_occupancy),
        }
    }

    fn validate(&self, signal: &str, value: f64) -> Result<()> {
        let range = self
            .range_for(signal)
            .ok_or_else(|| PricingError::UnknownSignal(signal.to_string()))?;

        if !value.is_finite() || value < range.min || value > range.max {
            return Err(PricingError::InvalidSignalValue {
                signal: signal.to_string(),
                value,
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }
}
