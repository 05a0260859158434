//! Pricing catalog: base rates, competitor prices and seasonal multipliers

use crate::config::CatalogConfig;
use crate::error::{PricingError, Result};
use dashmap::DashMap;
use thiserror::Error;
use tracing::info;

/// Catalog lookup failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("No base rate for {hotel_id}/{room_type}")]
    NotFound { hotel_id: String, room_type: String },
}

impl From<CatalogError> for PricingError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { hotel_id, room_type } => {
                PricingError::UnknownHotelOrRoomType { hotel_id, room_type }
            }
        }
    }
}

/// Source of base prices and the market data rules consult
pub trait PricingCatalog: Send + Sync {
    fn base_price(&self, hotel_id: &str, room_type: &str) -> std::result::Result<f64, CatalogError>;

    fn competitor_price(&self, hotel_id: &str, room_type: &str) -> Option<f64>;

    /// Seasonal multiplier for a calendar month; 1.0 when none is configured
    fn season_multiplier(&self, hotel_id: &str, month: u32) -> f64;
}

type RoomKey = (String, String);

/// Largest rate or multiplier the catalog accepts; keeps every quote finite
pub const MAX_CATALOG_VALUE: f64 = 1e12;

/// Catalog held in memory and updated by rate feeds
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    base_rates: DashMap<RoomKey, f64>,
    competitor_prices: DashMap<RoomKey, f64>,
    season_multipliers: DashMap<(String, u32), f64>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog from configuration
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let catalog = Self::new();
        for entry in &config.base_rates {
            catalog.set_base_rate(&entry.hotel_id, &entry.room_type, entry.price)?;
        }
        for entry in &config.competitor_prices {
            catalog.set_competitor_price(&entry.hotel_id, &entry.room_type, entry.price)?;
        }
        for entry in &config.season_multipliers {
            catalog.set_season_multiplier(&entry.hotel_id, entry.month, entry.multiplier)?;
        }

        info!(
            "Catalog seeded with {} base rates, {} competitor prices, {} season multipliers",
            catalog.base_rates.len(),
            catalog.competitor_prices.len(),
            catalog.season_multipliers.len()
        );
        Ok(catalog)
    }

    pub fn set_base_rate(&self, hotel_id: &str, room_type: &str, price: f64) -> Result<()> {
        check_positive("base rate", price)?;
        self.base_rates.insert(room_key(hotel_id, room_type), price);
        Ok(())
    }

    pub fn set_competitor_price(&self, hotel_id: &str, room_type: &str, price: f64) -> Result<()> {
        check_positive("competitor price", price)?;
        self.competitor_prices.insert(room_key(hotel_id, room_type), price);
        Ok(())
    }

    pub fn set_season_multiplier(&self, hotel_id: &str, month: u32, multiplier: f64) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(PricingError::InvalidRequest(format!(
                "Invalid month {}: expected 1-12",
                month
            )));
        }
        check_positive("season multiplier", multiplier)?;
        self.season_multipliers.insert((hotel_id.to_string(), month), multiplier);
        Ok(())
    }
}

impl PricingCatalog for InMemoryCatalog {
    fn base_price(&self, hotel_id: &str, room_type: &str) -> std::result::Result<f64, CatalogError> {
        self.base_rates.get(&room_key(hotel_id, room_type)).map(|rate| *rate).ok_or_else(|| {
            CatalogError::NotFound { hotel_id: hotel_id.to_string(), room_type: room_type.to_string() }
        })
    }

    fn competitor_price(&self, hotel_id: &str, room_type: &str) -> Option<f64> {
        self.competitor_prices.get(&room_key(hotel_id, room_type)).map(|price| *price)
    }

    fn season_multiplier(&self, hotel_id: &str, month: u32) -> f64 {
        self.season_multipliers.get(&(hotel_id.to_string(), month)).map(|m| *m).unwrap_or(1.0)
    }
}

fn room_key(hotel_id: &str, room_type: &str) -> RoomKey {
    (hotel_id.to_string(), room_type.to_string())
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= MAX_CATALOG_VALUE {
        Ok(())
    } else {
        Err(PricingError::InvalidRequest(format!(
            "Invalid {} {}: must be positive and at most {:e}",
            what, value, MAX_CATALOG_VALUE
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog() {
        let catalog = InMemoryCatalog::from_config(&CatalogConfig::default()).unwrap();
        assert_eq!(catalog.base_price("H1", "DLX").unwrap(), 5000.0);
        assert_eq!(catalog.base_price("123", "deluxe").unwrap(), 250.0);
        assert_eq!(catalog.season_multiplier("H1", 12), 1.30);
        assert_eq!(catalog.season_multiplier("H1", 6), 1.0);
        assert_eq!(catalog.season_multiplier("123", 12), 1.0);
        assert_eq!(catalog.competitor_price("H1", "DLX"), None);
    }

    #[test]
    fn test_miss_converts_to_unknown_hotel_or_room_type() {
        let catalog = InMemoryCatalog::new();
        let err: PricingError = catalog.base_price("H9", "DLX").unwrap_err().into();
        assert_eq!(
            err,
            PricingError::UnknownHotelOrRoomType {
                hotel_id: "H9".to_string(),
                room_type: "DLX".to_string()
            }
        );
    }

    #[test]
    fn test_feed_updates() {
        let catalog = InMemoryCatalog::new();
        catalog.set_base_rate("H1", "STD", 3000.0).unwrap();
        catalog.set_base_rate("H1", "STD", 3200.0).unwrap();
        catalog.set_competitor_price("H1", "STD", 2800.0).unwrap();
        catalog.set_season_multiplier("H1", 7, 1.15).unwrap();

        assert_eq!(catalog.base_price("H1", "STD").unwrap(), 3200.0);
        assert_eq!(catalog.competitor_price("H1", "STD"), Some(2800.0));
        assert_eq!(catalog.season_multiplier("H1", 7), 1.15);
    }

    #[test]
    fn test_invalid_feed_values_are_rejected() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.set_base_rate("H1", "STD", 0.0).is_err());
        assert!(catalog.set_base_rate("H1", "STD", -10.0).is_err());
        assert!(catalog.set_competitor_price("H1", "STD", f64::NAN).is_err());
        assert!(catalog.set_season_multiplier("H1", 0, 1.1).is_err());
        assert!(catalog.set_season_multiplier("H1", 5, 0.0).is_err());
        assert!(catalog.base_price("H1", "STD").is_err());
    }

    #[test]
    fn test_oversized_feed_values_are_rejected() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.set_base_rate("Z", "room", 1e308).is_err());
        assert!(catalog.set_competitor_price("Z", "room", f64::MAX).is_err());
        assert!(catalog.set_season_multiplier("Z", 3, 1e13).is_err());
        assert!(catalog.base_price("Z", "room").is_err());

        catalog.set_base_rate("Z", "room", MAX_CATALOG_VALUE).unwrap();
        assert_eq!(catalog.base_price("Z", "room").unwrap(), MAX_CATALOG_VALUE);
    }
}
