//! Core request, adjustment and quote types

use crate::error::{PricingError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Longest accepted segment identifier
pub const MAX_SEGMENT_LEN: usize = 32;

/// Longest accepted stay
pub const MAX_NIGHTS: u32 = 365;

/// Caller segment used by segment-based rules.
///
/// A segment string is well-formed when it is 1 to [`MAX_SEGMENT_LEN`] characters of ASCII
/// letters, digits, `_` or `-`. Well-formed but unrecognised segments resolve to
/// [`UserSegment::Standard`]; malformed ones are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSegment {
    Standard,
    Member,
    Loyal,
    Silver,
    Gold,
    Platinum,
    Corporate,
    Vip,
}

impl UserSegment {
    pub const ALL: [UserSegment; 8] = [
        UserSegment::Standard,
        UserSegment::Member,
        UserSegment::Loyal,
        UserSegment::Silver,
        UserSegment::Gold,
        UserSegment::Platinum,
        UserSegment::Corporate,
        UserSegment::Vip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserSegment::Standard => "standard",
            UserSegment::Member => "member",
            UserSegment::Loyal => "loyal",
            UserSegment::Silver => "silver",
            UserSegment::Gold => "gold",
            UserSegment::Platinum => "platinum",
            UserSegment::Corporate => "corporate",
            UserSegment::Vip => "vip",
        }
    }

    /// Look up a known segment by name, ignoring case. `guest` is an alias of `standard`.
    pub fn known(raw: &str) -> Option<UserSegment> {
        let lowered = raw.to_ascii_lowercase();
        if lowered == "guest" {
            return Some(UserSegment::Standard);
        }
        UserSegment::ALL.into_iter().find(|segment| segment.as_str() == lowered)
    }

    /// Resolve a raw segment parameter.
    ///
    /// `None` means the caller did not send a segment and yields `Standard`.
    pub fn resolve(raw: Option<&str>) -> Result<UserSegment> {
        let Some(raw) = raw else {
            return Ok(UserSegment::Standard);
        };

        if !is_well_formed_segment(raw) {
            return Err(PricingError::InvalidRequest(format!(
                "Malformed userSegment '{}': expected 1-{} characters of [A-Za-z0-9_-]",
                raw, MAX_SEGMENT_LEN
            )));
        }

        match UserSegment::known(raw) {
            Some(segment) => Ok(segment),
            None => {
                debug!("Unrecognised user segment '{}', using standard tier", raw);
                Ok(UserSegment::Standard)
            }
        }
    }
}

impl fmt::Display for UserSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_well_formed_segment(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_SEGMENT_LEN
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Unvalidated quote inputs as received from a transport layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    pub hotel_id: Option<String>,
    pub room_type: Option<String>,
    pub check_in: Option<String>,
    pub user_segment: Option<String>,
    pub nights: Option<String>,
}

impl QuoteParams {
    pub fn new(hotel_id: &str, room_type: &str, check_in: &str, user_segment: &str) -> Self {
        Self {
            hotel_id: Some(hotel_id.to_string()),
            room_type: Some(room_type.to_string()),
            check_in: Some(check_in.to_string()),
            user_segment: Some(user_segment.to_string()),
            nights: None,
        }
    }

    pub fn with_nights(mut self, nights: &str) -> Self {
        self.nights = Some(nights.to_string());
        self
    }

    /// Validate into a [`PriceQuoteRequest`]
    pub fn validate(&self) -> Result<PriceQuoteRequest> {
        let hotel_id = required(&self.hotel_id, "hotelId")?;
        let room_type = required(&self.room_type, "roomType")?;
        let check_in_raw = required(&self.check_in, "checkIn")?;

        let check_in = NaiveDate::parse_from_str(&check_in_raw, "%Y-%m-%d").map_err(|_| {
            PricingError::InvalidRequest(format!(
                "Invalid checkIn '{}': expected YYYY-MM-DD",
                check_in_raw
            ))
        })?;

        let user_segment = UserSegment::resolve(self.user_segment.as_deref())?;

        let nights = match self.nights.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw.parse::<u32>().ok().filter(|n| (1..=MAX_NIGHTS).contains(n)).ok_or_else(
                || {
                    PricingError::InvalidRequest(format!(
                        "Invalid nights '{}': expected an integer in [1, {}]",
                        raw, MAX_NIGHTS
                    ))
                },
            )?,
        };

        Ok(PriceQuoteRequest { hotel_id, room_type, check_in, nights, user_segment })
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(PricingError::InvalidRequest(format!("Missing required param: {}", name))),
    }
}

/// A validated quote request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteRequest {
    pub hotel_id: String,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub nights: u32,
    pub user_segment: UserSegment,
}

impl PriceQuoteRequest {
    pub fn new(hotel_id: &str, room_type: &str, check_in: NaiveDate, user_segment: UserSegment) -> Self {
        Self {
            hotel_id: hotel_id.to_string(),
            room_type: room_type.to_string(),
            check_in,
            nights: 1,
            user_segment,
        }
    }
}

/// Normalised demand pressure in [0, 1]; recomputed per request
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandIndex(f64);

impl DemandIndex {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// How an adjustment changes the running price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Multiplier,
    Additive,
    Floor,
    Cap,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdjustmentKind::Multiplier => "multiplier",
            AdjustmentKind::Additive => "additive",
            AdjustmentKind::Floor => "floor",
            AdjustmentKind::Cap => "cap",
        };
        f.write_str(name)
    }
}

/// A price adjustment produced by a firing rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Multiply the running price (compounds with earlier multipliers)
    Multiplier(f64),
    /// Add a fixed amount; negative for a flat discount
    Additive(f64),
    /// Raise the running price to at least this value
    Floor(f64),
    /// Lower the running price to at most this value
    Cap(f64),
}

impl Adjustment {
    pub fn kind(&self) -> AdjustmentKind {
        match self {
            Adjustment::Multiplier(_) => AdjustmentKind::Multiplier,
            Adjustment::Additive(_) => AdjustmentKind::Additive,
            Adjustment::Floor(_) => AdjustmentKind::Floor,
            Adjustment::Cap(_) => AdjustmentKind::Cap,
        }
    }

    pub fn magnitude(&self) -> f64 {
        match *self {
            Adjustment::Multiplier(m)
            | Adjustment::Additive(m)
            | Adjustment::Floor(m)
            | Adjustment::Cap(m) => m,
        }
    }

    pub fn apply(&self, price: f64) -> f64 {
        match *self {
            Adjustment::Multiplier(m) => price * m,
            Adjustment::Additive(a) => price + a,
            Adjustment::Floor(f) => price.max(f),
            Adjustment::Cap(c) => price.min(c),
        }
    }
}

/// Record of a rule that fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    pub name: String,
    pub kind: AdjustmentKind,
    pub magnitude: f64,
    pub price_before: f64,
    pub price_after: f64,
    pub exclusive: bool,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// The explainable result of a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub base_price: f64,
    pub final_price: f64,
    pub demand_index: DemandIndex,
    pub nights: u32,
    pub total_price: f64,
    pub applied_rules: Vec<AppliedRule>,
    pub audit_trail: Vec<String>,
    pub forecaster: String,
}

/// Round a money amount to cents, halves away from zero
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Round a money amount up to the next cent.
///
/// Amounts already on a cent boundary (up to float noise) are left alone, so `0.7 * 100.0`
/// gives 70.00 rather than 70.01.
pub fn ceil_cents(amount: f64) -> f64 {
    let cents = amount * 100.0;
    let nearest = cents.round();
    if (cents - nearest).abs() < 1e-6 {
        nearest / 100.0
    } else {
        cents.ceil() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_known_values_case_insensitive() {
        assert_eq!(UserSegment::resolve(Some("loyal")).unwrap(), UserSegment::Loyal);
        assert_eq!(UserSegment::resolve(Some("LOYAL")).unwrap(), UserSegment::Loyal);
        assert_eq!(UserSegment::resolve(Some("Vip")).unwrap(), UserSegment::Vip);
        assert_eq!(UserSegment::resolve(Some("guest")).unwrap(), UserSegment::Standard);
    }

    #[test]
    fn test_segment_unknown_but_well_formed_falls_back() {
        assert_eq!(UserSegment::resolve(Some("diamond")).unwrap(), UserSegment::Standard);
        assert_eq!(UserSegment::resolve(Some("tier-9_x")).unwrap(), UserSegment::Standard);
        assert_eq!(UserSegment::resolve(None).unwrap(), UserSegment::Standard);
    }

    #[test]
    fn test_segment_malformed_is_rejected() {
        let too_long = "a".repeat(MAX_SEGMENT_LEN + 1);
        for raw in ["", "gold member", "vip!", "ünicode", too_long.as_str()] {
            let err = UserSegment::resolve(Some(raw)).unwrap_err();
            assert_eq!(err.code(), "INVALID_REQUEST", "segment {:?} should be malformed", raw);
        }
        assert!(UserSegment::resolve(Some(&"a".repeat(MAX_SEGMENT_LEN))).is_ok());
    }

    #[test]
    fn test_quote_params_validation() {
        let request = QuoteParams::new("123", "deluxe", "2025-09-27", "loyal").validate().unwrap();
        assert_eq!(request.hotel_id, "123");
        assert_eq!(request.check_in, NaiveDate::from_ymd_opt(2025, 9, 27).unwrap());
        assert_eq!(request.nights, 1);
        assert_eq!(request.user_segment, UserSegment::Loyal);

        let request = QuoteParams::new("123", "deluxe", "2025-09-27", "loyal")
            .with_nights("3")
            .validate()
            .unwrap();
        assert_eq!(request.nights, 3);
    }

    #[test]
    fn test_quote_params_rejections() {
        let bad_date = QuoteParams::new("123", "deluxe", "27/09/2025", "loyal").validate();
        assert!(matches!(bad_date, Err(PricingError::InvalidRequest(_))));

        let missing_hotel = QuoteParams {
            room_type: Some("deluxe".to_string()),
            check_in: Some("2025-09-27".to_string()),
            ..Default::default()
        }
        .validate();
        match missing_hotel {
            Err(PricingError::InvalidRequest(msg)) => assert!(msg.contains("hotelId")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }

        let blank_room = QuoteParams::new("123", "   ", "2025-09-27", "loyal").validate();
        assert!(matches!(blank_room, Err(PricingError::InvalidRequest(_))));

        for nights in ["0", "-1", "abc", "366"] {
            let result =
                QuoteParams::new("123", "deluxe", "2025-09-27", "loyal").with_nights(nights).validate();
            assert!(matches!(result, Err(PricingError::InvalidRequest(_))), "nights {}", nights);
        }
    }

    #[test]
    fn test_adjustment_application() {
        assert_eq!(Adjustment::Multiplier(1.2).apply(100.0), 120.0);
        assert_eq!(Adjustment::Additive(-15.0).apply(100.0), 85.0);
        assert_eq!(Adjustment::Floor(90.0).apply(80.0), 90.0);
        assert_eq!(Adjustment::Floor(90.0).apply(95.0), 95.0);
        assert_eq!(Adjustment::Cap(90.0).apply(95.0), 90.0);
        assert_eq!(Adjustment::Cap(90.0).kind(), AdjustmentKind::Cap);
        assert_eq!(Adjustment::Cap(90.0).magnitude(), 90.0);
    }

    #[test]
    fn test_demand_index_is_clamped() {
        assert_eq!(DemandIndex::new(1.4).value(), 1.0);
        assert_eq!(DemandIndex::new(-0.2).value(), 0.0);
        assert_eq!(DemandIndex::new(f64::NAN).value(), 0.0);
        assert_eq!(DemandIndex::new(0.42).value(), 0.42);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_cents(10.006), 10.01);
        assert_eq!(round_cents(99.994), 99.99);
        assert_eq!(ceil_cents(33.331), 33.34);
        assert_eq!(ceil_cents(2500.0), 2500.0);
        assert_eq!(ceil_cents(0.7 * 100.0), 70.0);
    }
}
