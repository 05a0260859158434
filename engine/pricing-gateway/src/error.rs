//! Error types for the PricingGateway

use pricing_engine::PricingError;
use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;

/// Errors that can occur while serving a request
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing required param: {0}")]
    MissingParam(String),

    #[error("Invalid value '{value}' for param {name}")]
    InvalidParam { name: String, value: String },

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl GatewayError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParam(_) | GatewayError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Pricing(err) => match err {
                PricingError::UnknownHotelOrRoomType { .. } | PricingError::UnknownHotel(_) => {
                    StatusCode::NOT_FOUND
                }
                err if err.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::MissingParam(_) => "MISSING_PARAMETER",
            GatewayError::InvalidParam { .. } => "INVALID_PARAMETER",
            GatewayError::Pricing(err) => err.code(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            GatewayError::InvalidParam { name, .. } => Some(serde_json::json!({ "param": name })),
            GatewayError::Pricing(PricingError::InvalidSignalValue { signal, value, min, max }) => {
                Some(serde_json::json!({ "signal": signal, "value": value, "min": min, "max": max }))
            }
            GatewayError::Pricing(PricingError::UnknownHotelOrRoomType { hotel_id, room_type }) => {
                Some(serde_json::json!({ "hotelId": hotel_id, "roomType": room_type }))
            }
            _ => None,
        }
    }

    /// Render as the JSON error body
    pub fn to_response(&self) -> ErrorResponse {
        // Internal details stay in the logs
        let message = if self.status().is_server_error() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse::new(self.code(), message).with_details(self.details())
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail { code: code.to_string(), message: message.into(), details: None },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.error.details = details;
        self
    }
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Result type for PricingGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::MissingParam("hotelId".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::from(PricingError::UnknownSignal("weather".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(PricingError::UnknownHotel("H9".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::from(PricingError::Config("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_status_follows_engine_classification() {
        let client = PricingError::InvalidRequest("bad date".into());
        assert!(client.is_client_error());
        assert_eq!(GatewayError::from(client).status(), StatusCode::BAD_REQUEST);

        let fault = PricingError::RuleEvaluationFault { rule: "Broken".into(), reason: "boom".into() };
        assert!(!fault.is_client_error());
        assert_eq!(GatewayError::from(fault).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = GatewayError::from(PricingError::Config("secret path".into())).to_response();
        assert_eq!(response.error.code, "CONFIG_ERROR");
        assert_eq!(response.error.message, "Internal Server Error");
    }

    #[test]
    fn test_client_errors_explain_themselves() {
        let err = GatewayError::from(PricingError::InvalidSignalValue {
            signal: "occupancy".into(),
            value: 1.5,
            min: 0.0,
            max: 1.0,
        });
        let response = err.to_response();
        assert_eq!(response.error.code, "INVALID_SIGNAL_VALUE");
        assert!(response.error.message.contains("1.5"));
        assert_eq!(response.error.details.unwrap()["max"], serde_json::json!(1.0));
    }
}
