//! Request types for the Courier Quote Engine API.
//!
//! This module defines the JSON request structures for the `/recommend` and
//! `/couriers` endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::QuoteRequest;
use crate::config::CourierConfigInput;
use crate::models::ShipmentRequest;
use crate::reference::{ReferenceRow, normalize_pincode_text};

/// A pincode as sent by clients: text or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PincodeInput {
    /// A pincode given as a string.
    Text(String),
    /// A pincode given as a JSON number.
    Number(u64),
}

impl PincodeInput {
    /// Returns the normalized pincode text.
    pub fn normalized(&self) -> String {
        match self {
            PincodeInput::Text(text) => normalize_pincode_text(text),
            PincodeInput::Number(number) => number.to_string(),
        }
    }
}

/// Request body for the `/recommend` endpoint.
///
/// Weight `i` pairs with pincode `i`. When fewer weights than pincodes are
/// given, the last weight is reused (zero when none were given).
///
/// # Example
///
/// ```
/// use courier_quote_engine::api::RecommendRequest;
///
/// let request: RecommendRequest = serde_json::from_str(
///     r#"{"pincodes": ["110001", 400001], "weights": [10], "declared_value": 1000}"#,
/// ).unwrap();
/// let quotes = request.into_quote_requests();
///
/// assert_eq!(quotes.len(), 2);
/// assert_eq!(quotes[1].pincode, "400001");
/// assert_eq!(quotes[1].shipment.actual_weight, quotes[0].shipment.actual_weight);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Destination pincodes.
    pub pincodes: Vec<PincodeInput>,
    /// Actual weights in kilograms.
    #[serde(default)]
    pub weights: Vec<Decimal>,
    /// Volumetric weights in kilograms; missing entries mean none measured.
    #[serde(default)]
    pub volumetric_weights: Vec<Option<Decimal>>,
    /// Declared value applied to every shipment.
    #[serde(default)]
    pub declared_value: Decimal,
}

impl RecommendRequest {
    /// Expands the request into one quote request per non-blank pincode.
    pub fn into_quote_requests(self) -> Vec<QuoteRequest> {
        let mut last_weight = Decimal::ZERO;
        let mut requests = Vec::with_capacity(self.pincodes.len());

        for (index, pincode) in self.pincodes.iter().enumerate() {
            if let Some(weight) = self.weights.get(index) {
                last_weight = *weight;
            }
            let pincode = pincode.normalized();
            if pincode.is_empty() {
                continue;
            }
            requests.push(QuoteRequest {
                pincode,
                shipment: ShipmentRequest {
                    actual_weight: last_weight,
                    volumetric_weight: self.volumetric_weights.get(index).copied().flatten(),
                    declared_value: self.declared_value,
                },
            });
        }
        requests
    }
}

/// Request body for `POST /couriers`.
///
/// The courier fields follow the same rules as courier YAML files. When
/// `reference_rows` is absent an existing courier keeps its reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct CourierUpsertRequest {
    /// The courier configuration.
    pub courier: CourierConfigInput,
    /// Optional replacement pincode reference rows.
    #[serde(default)]
    pub reference_rows: Option<Vec<ReferenceRow>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_weights_pair_by_index() {
        let request: RecommendRequest = serde_json::from_str(
            r#"{"pincodes": ["110001", "400001"], "weights": [2, 3.5], "volumetric_weights": [null, 5]}"#,
        )
        .unwrap();
        let quotes = request.into_quote_requests();

        assert_eq!(quotes[0].shipment.actual_weight, dec("2"));
        assert_eq!(quotes[0].shipment.volumetric_weight, None);
        assert_eq!(quotes[1].shipment.actual_weight, dec("3.5"));
        assert_eq!(quotes[1].shipment.volumetric_weight, Some(dec("5")));
        assert_eq!(quotes[1].shipment.declared_value, Decimal::ZERO);
    }

    #[test]
    fn test_missing_weights_reuse_last_weight() {
        let request: RecommendRequest =
            serde_json::from_str(r#"{"pincodes": ["1", "2", "3"], "weights": [4]}"#).unwrap();
        let weights: Vec<Decimal> = request
            .into_quote_requests()
            .iter()
            .map(|q| q.shipment.actual_weight)
            .collect();
        assert_eq!(weights, vec![dec("4"), dec("4"), dec("4")]);
    }

    #[test]
    fn test_no_weights_defaults_to_zero() {
        let request: RecommendRequest = serde_json::from_str(r#"{"pincodes": ["110001"]}"#).unwrap();
        assert_eq!(request.into_quote_requests()[0].shipment.actual_weight, Decimal::ZERO);
    }

    #[test]
    fn test_blank_pincodes_are_skipped() {
        let request: RecommendRequest =
            serde_json::from_str(r#"{"pincodes": [" ", "110001.0"], "weights": [1, 2]}"#).unwrap();
        let quotes = request.into_quote_requests();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].pincode, "110001");
        assert_eq!(quotes[0].shipment.actual_weight, dec("2"));
    }

    #[test]
    fn test_upsert_request_parses_inline_rates() {
        let request: CourierUpsertRequest = serde_json::from_str(
            r#"{"courier": {"name": "Delhivery", "rates": {"A": 18}, "oda_type": "Fixed"},
                "reference_rows": [{"pincode": 110001, "zone": "A"}]}"#,
        )
        .unwrap();
        let config = request.courier.into_config().unwrap();
        assert_eq!(config.rates.get("A"), Some(dec("18")));
        assert_eq!(request.reference_rows.unwrap().len(), 1);
    }
}
