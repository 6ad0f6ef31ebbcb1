//! Shipment model.
//!
//! This module defines the [`ShipmentRequest`] struct: one weight/value
//! instance to be priced against every courier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest accepted weight (kg) or declared value: 10^12.
pub const MAX_SHIPMENT_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// A single shipment to price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    /// The actual (dead) weight in kilograms.
    pub actual_weight: Decimal,
    /// The volumetric weight in kilograms, if measured.
    #[serde(default)]
    pub volumetric_weight: Option<Decimal>,
    /// The declared value of the goods.
    #[serde(default)]
    pub declared_value: Decimal,
}

impl ShipmentRequest {
    /// Creates a shipment without a volumetric weight.
    pub fn new(actual_weight: Decimal, declared_value: Decimal) -> Self {
        Self {
            actual_weight,
            volumetric_weight: None,
            declared_value,
        }
    }

    /// Returns the chargeable weight.
    ///
    /// The greater of actual and volumetric weight when a non-zero
    /// volumetric weight is present, otherwise the actual weight.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_quote_engine::models::ShipmentRequest;
    /// use rust_decimal::Decimal;
    ///
    /// let mut shipment = ShipmentRequest::new(Decimal::new(4, 0), Decimal::ZERO);
    /// assert_eq!(shipment.effective_weight(), Decimal::new(4, 0));
    ///
    /// shipment.volumetric_weight = Some(Decimal::new(65, 1));
    /// assert_eq!(shipment.effective_weight(), Decimal::new(65, 1));
    /// ```
    pub fn effective_weight(&self) -> Decimal {
        match self.volumetric_weight {
            Some(volumetric) if !volumetric.is_zero() => self.actual_weight.max(volumetric),
            _ => self.actual_weight,
        }
    }

    /// Checks the input contract: weights and declared value are
    /// non-negative and at most [`MAX_SHIPMENT_AMOUNT`].
    pub fn validate(&self) -> EngineResult<()> {
        check_amount("actual_weight", self.actual_weight)?;
        if let Some(volumetric) = self.volumetric_weight {
            check_amount("volumetric_weight", volumetric)?;
        }
        check_amount("declared_value", self.declared_value)
    }
}

fn check_amount(field: &str, value: Decimal) -> EngineResult<()> {
    let message = if value < Decimal::ZERO {
        "must not be negative".to_string()
    } else if value > MAX_SHIPMENT_AMOUNT {
        format!("must not exceed {}", MAX_SHIPMENT_AMOUNT)
    } else {
        return Ok(());
    };
    Err(EngineError::InvalidShipment {
        field: field.to_string(),
        message,
    })
}
