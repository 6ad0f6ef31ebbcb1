//! Response types for the Courier Quote Engine API.
//!
//! This module defines the success bodies and the error response structures
//! and error handling for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::cheapest_quotes;
use crate::config::CourierConfig;
use crate::error::EngineError;
use crate::history::RecentQuote;
use crate::models::QuoteResult;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a courier not found error response.
    pub fn courier_not_found(name: &str) -> Self {
        Self::with_details(
            "COURIER_NOT_FOUND",
            format!("Courier not found: {}", name),
            format!("No courier named '{}' is configured", name),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::CourierNotFound { name } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::courier_not_found(&name),
            },
            EngineError::InvalidConfiguration { subject, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_CONFIGURATION",
                    format!("Invalid configuration for '{}': {}", subject, message),
                    "The courier configuration failed validation",
                ),
            },
            EngineError::MalformedRateData { message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "MALFORMED_RATE_DATA",
                    "Malformed rate data",
                    message,
                ),
            },
            EngineError::InvalidShipment { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_SHIPMENT",
                    format!("Invalid shipment field '{}': {}", field, message),
                    "The shipment data contains invalid information",
                ),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message,
                ),
            },
        }
    }
}

/// The cheapest priced courier for one requested pincode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The destination pincode.
    pub pincode: String,
    /// The recommended courier.
    pub courier: String,
    /// The courier's total.
    pub total: Decimal,
}

/// Response body for `POST /recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// Always true for a 200 response.
    pub success: bool,
    /// Every (pincode, courier) quote, pincode-major in courier order.
    pub results: Vec<QuoteResult>,
    /// The cheapest priced courier per pincode.
    pub recommendations: Vec<Recommendation>,
}

impl RecommendResponse {
    /// Builds the response from batch results.
    pub fn from_results(results: Vec<QuoteResult>, courier_count: usize) -> Self {
        let recommendations = cheapest_quotes(&results, courier_count)
            .into_iter()
            .filter_map(|quote| {
                quote.total().map(|total| Recommendation {
                    pincode: quote.pincode.clone(),
                    courier: quote.courier.clone(),
                    total,
                })
            })
            .collect();
        Self {
            success: true,
            results,
            recommendations,
        }
    }
}

/// One courier as returned by the `/couriers` endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CourierResponse {
    /// The courier configuration.
    #[serde(flatten)]
    pub config: CourierConfig,
    /// Number of pincodes in the courier's reference table.
    pub reference_pincodes: usize,
}

/// Response body for `GET /couriers`.
#[derive(Debug, Clone, Serialize)]
pub struct CourierListResponse {
    /// Couriers in catalog order.
    pub couriers: Vec<CourierResponse>,
}

/// Response body for `GET /recent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentResponse {
    /// Recent successful quotes, newest first.
    pub recent: Vec<RecentQuote>,
}

/// Acknowledgement body for mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always true for a 200 response.
    pub success: bool,
    /// What was done.
    pub message: String,
}

impl AckResponse {
    /// Creates a successful acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
