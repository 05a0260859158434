//! Demand Index Calculator
//!
//! A [`DemandForecaster`] condenses a hotel's signal snapshot and the request context into a
//! single [`DemandIndex`]. Forecasters are pure: the same inputs always give the same index.
//!
//! The [`HeuristicForecaster`] is a weighted sum of three factors, each in [0, 1]:
//!
//! - occupancy, the dominant factor
//! - lead time, `exp(-days / decay_days)`, so 1.0 on the day of arrival and falling with distance
//! - day of week, 1.0 for peak check-in weekdays, 0.0 otherwise
//!
//! Because the weights are non-negative and sum to one, the index stays in [0, 1] and is
//! continuous and non-decreasing in occupancy.

use crate::config::DemandConfig;
use crate::signals::SignalSnapshot;
use crate::types::{DemandIndex, PriceQuoteRequest};
use chrono::{Datelike, NaiveDate, Weekday};

/// Everything a forecaster may look at for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandInputs {
    /// Occupancy in [0, 1]
    pub occupancy: f64,
    /// Whole days until check-in; 0 for today or any past date
    pub lead_time_days: i64,
    pub check_in_weekday: Weekday,
}

impl DemandInputs {
    pub fn from_snapshot(
        snapshot: &SignalSnapshot,
        request: &PriceQuoteRequest,
        as_of: NaiveDate,
    ) -> Self {
        let lead_time_days = (request.check_in - as_of).num_days().max(0);

        Self {
            occupancy: snapshot.occupancy().clamp(0.0, 1.0),
            lead_time_days,
            check_in_weekday: request.check_in.weekday(),
        }
    }
}

/// Pluggable demand model
pub trait DemandForecaster: Send + Sync {
    /// Identifier reported in quotes
    fn name(&self) -> &str;

    fn forecast(&self, inputs: &DemandInputs) -> DemandIndex;

    /// Forecast straight from a snapshot and request
    fn compute(
        &self,
        snapshot: &SignalSnapshot,
        request: &PriceQuoteRequest,
        as_of: NaiveDate,
    ) -> DemandIndex {
        self.forecast(&DemandInputs::from_snapshot(snapshot, request, as_of))
    }
}

/// Weighted occupancy, lead-time and day-of-week forecaster
#[derive(Debug, Clone, Default)]
pub struct HeuristicForecaster {
    config: DemandConfig,
}

impl HeuristicForecaster {
    pub fn new(config: DemandConfig) -> Self {
        Self { config }
    }

    fn lead_time_factor(&self, days: i64) -> f64 {
        (-(days.max(0) as f64) / self.config.lead_time_decay_days).exp()
    }

    fn day_of_week_factor(&self, weekday: Weekday) -> f64 {
        if self.config.peak_weekdays.contains(&weekday) {
            1.0
        } else {
            0.0
        }
    }
}

impl DemandForecaster for HeuristicForecaster {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn forecast(&self, inputs: &DemandInputs) -> DemandIndex {
        let config = &self.config;
        let score = config.occupancy_weight * inputs.occupancy.clamp(0.0, 1.0)
            + config.lead_time_weight * self.lead_time_factor(inputs.lead_time_days)
            + config.day_of_week_weight * self.day_of_week_factor(inputs.check_in_weekday);

        DemandIndex::new(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::OCCUPANCY;
    use crate::types::UserSegment;
    use crate::SignalStore;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs(occupancy: f64, lead_time_days: i64, weekday: Weekday) -> DemandInputs {
        DemandInputs { occupancy, lead_time_days, check_in_weekday: weekday }
    }

    #[test]
    fn test_weighted_sum() {
        let forecaster = HeuristicForecaster::default();

        // same-day stay on a peak weekday at full occupancy saturates
        assert!((forecaster.forecast(&inputs(1.0, 0, Weekday::Sat)).value() - 1.0).abs() < 1e-12);

        // empty hotel, far out, off-peak: only the tiny lead-time residue remains
        let low = forecaster.forecast(&inputs(0.0, 365, Weekday::Tue)).value();
        assert!(low < 0.001);

        let mid = forecaster.forecast(&inputs(0.5, 21, Weekday::Wed)).value();
        let expected = 0.6 * 0.5 + 0.3 * (-1.0f64).exp();
        assert!((mid - expected).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_occupancy() {
        let forecaster = HeuristicForecaster::default();
        let mut previous = 0.0;
        for step in 0..=100 {
            let occupancy = step as f64 / 100.0;
            let index = forecaster.forecast(&inputs(occupancy, 10, Weekday::Thu)).value();
            assert!(index >= previous, "index fell at occupancy {}", occupancy);
            previous = index;
        }
    }

    #[test]
    fn test_shorter_lead_time_raises_demand() {
        let forecaster = HeuristicForecaster::default();
        let near = forecaster.forecast(&inputs(0.5, 1, Weekday::Mon)).value();
        let far = forecaster.forecast(&inputs(0.5, 90, Weekday::Mon)).value();
        assert!(near > far);
    }

    #[test]
    fn test_past_check_in_is_maximum_urgency() {
        let snapshot = SignalSnapshot::empty("H1", 0.5);
        let request =
            PriceQuoteRequest::new("H1", "DLX", date(2025, 1, 10), UserSegment::Standard);

        let past = DemandInputs::from_snapshot(&snapshot, &request, date(2025, 2, 1));
        assert_eq!(past.lead_time_days, 0);

        let same_day = DemandInputs::from_snapshot(&snapshot, &request, date(2025, 1, 10));
        let forecaster = HeuristicForecaster::default();
        assert_eq!(forecaster.forecast(&past), forecaster.forecast(&same_day));
    }

    #[test]
    fn test_compute_reads_snapshot_occupancy() {
        let store = SignalStore::new(Default::default());
        store.ingest("H1", OCCUPANCY, 0.9, Utc::now()).unwrap();

        // 2025-01-10 is a Friday
        let request =
            PriceQuoteRequest::new("H1", "DLX", date(2025, 1, 10), UserSegment::Standard);
        let forecaster = HeuristicForecaster::default();

        let reported = forecaster.compute(&store.read("H1"), &request, date(2025, 1, 3));
        let unknown = forecaster.compute(&store.read("H2"), &request, date(2025, 1, 3));
        assert!(reported > unknown);

        let expected = 0.6 * 0.9 + 0.3 * (-7.0f64 / 21.0).exp() + 0.1;
        assert!((reported.value() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let forecaster = HeuristicForecaster::default();
        let input = inputs(0.73, 4, Weekday::Fri);
        assert_eq!(forecaster.forecast(&input), forecaster.forecast(&input));
    }

    #[test]
    fn test_custom_peak_days() {
        let forecaster = HeuristicForecaster::new(DemandConfig {
            peak_weekdays: vec![Weekday::Sun],
            ..Default::default()
        });
        let sunday = forecaster.forecast(&inputs(0.5, 30, Weekday::Sun)).value();
        let saturday = forecaster.forecast(&inputs(0.5, 30, Weekday::Sat)).value();
        assert!((sunday - saturday - 0.1).abs() < 1e-12);
    }
}
