//! Error types for the pricing engine

use thiserror::Error;

/// Result type for pricing engine operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur while ingesting signals or producing quotes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Invalid value {value} for signal '{signal}': expected a value in [{min}, {max}]")]
    InvalidSignalValue { signal: String, value: f64, min: f64, max: f64 },

    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    #[error("Unknown hotel: {0}")]
    UnknownHotel(String),

    #[error("No base price for hotel '{hotel_id}' and room type '{room_type}'")]
    UnknownHotelOrRoomType { hotel_id: String, room_type: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rule '{rule}' failed during evaluation: {reason}")]
    RuleEvaluationFault { rule: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PricingError {
    /// Stable machine-readable code, used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            PricingError::InvalidSignalValue { .. } => "INVALID_SIGNAL_VALUE",
            PricingError::UnknownSignal(_) => "UNKNOWN_SIGNAL",
            PricingError::UnknownHotel(_) => "UNKNOWN_HOTEL",
            PricingError::UnknownHotelOrRoomType { .. } => "UNKNOWN_HOTEL_OR_ROOM_TYPE",
            PricingError::InvalidRequest(_) => "INVALID_REQUEST",
            PricingError::RuleEvaluationFault { .. } => "RULE_EVALUATION_FAULT",
            PricingError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True for errors caused by caller input rather than the engine itself
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PricingError::RuleEvaluationFault { .. } | PricingError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = PricingError::UnknownHotelOrRoomType {
            hotel_id: "H9".to_string(),
            room_type: "DLX".to_string(),
        };
        assert_eq!(err.code(), "UNKNOWN_HOTEL_OR_ROOM_TYPE");
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "No base price for hotel 'H9' and room type 'DLX'");

        let fault = PricingError::RuleEvaluationFault {
            rule: "Broken".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(fault.code(), "RULE_EVALUATION_FAULT");
        assert!(!fault.is_client_error());
    }

    #[test]
    fn test_invalid_signal_message() {
        let err = PricingError::InvalidSignalValue {
            signal: "occupancy".to_string(),
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 1.5 for signal 'occupancy': expected a value in [0, 1]"
        );
    }
}
