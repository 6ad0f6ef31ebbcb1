//! Out-of-delivery-area surcharge calculation.
//!
//! Couriers price ODA destinations one of two ways: a fixed fee per
//! shipment, or a flat charge looked up in an [`OdaChargeMatrix`] banded by
//! distance beyond the network and by shipment weight.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::MAX_CONFIG_AMOUNT;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DestinationRecord};

/// One weight bracket within a distance band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightBracket {
    /// Inclusive weight ceiling in kilograms.
    pub max_weight_kg: Decimal,
    /// Flat charge for shipments up to the ceiling.
    pub charge: Decimal,
}

/// One distance band of the matrix (`min_km <= d <= max_km`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceBand {
    /// Inclusive lower distance bound in kilometers.
    pub min_km: Decimal,
    /// Inclusive upper distance bound in kilometers.
    pub max_km: Decimal,
    /// Weight brackets in ascending ceiling order.
    pub brackets: Vec<WeightBracket>,
}

impl DistanceBand {
    fn contains(&self, distance_km: Decimal) -> bool {
        self.min_km <= distance_km && distance_km <= self.max_km
    }

    /// Charge of the first bracket the weight fits, else the last bracket.
    fn charge_for(&self, weight_kg: Decimal) -> Decimal {
        self.brackets
            .iter()
            .find(|bracket| weight_kg <= bracket.max_weight_kg)
            .or_else(|| self.brackets.last())
            .map(|bracket| bracket.charge)
            .unwrap_or(Decimal::ZERO)
    }
}

// (min_km, max_km, [(max_weight_kg, charge); 4])
const STANDARD_BANDS: [(i64, i64, [(i64, i64); 4]); 10] = [
    (20, 50, [(100, 550), (250, 990), (500, 1100), (1000, 1375)]),
    (51, 100, [(100, 825), (250, 1210), (500, 1375), (1000, 1650)]),
    (101, 150, [(100, 1100), (250, 1650), (500, 1925), (1000, 2200)]),
    (151, 200, [(100, 1375), (250, 1925), (500, 2200), (1000, 2475)]),
    (201, 250, [(100, 1650), (250, 2200), (500, 2475), (1000, 2750)]),
    (251, 300, [(100, 1925), (250, 2475), (500, 2750), (1000, 3025)]),
    (301, 350, [(100, 2200), (250, 2750), (500, 3025), (1000, 3300)]),
    (351, 400, [(100, 2475), (250, 3025), (500, 3300), (1000, 3575)]),
    (401, 450, [(100, 2750), (250, 3300), (500, 3575), (1000, 3850)]),
    (451, 500, [(100, 3025), (250, 3575), (500, 3850), (1000, 4125)]),
];

/// Distance/weight banded ODA charges used by the `Special` ODA policy.
///
/// # Example
///
/// ```
/// use courier_quote_engine::calculation::OdaChargeMatrix;
/// use rust_decimal::Decimal;
///
/// let matrix = OdaChargeMatrix::standard();
/// assert_eq!(matrix.get_oda_charge(Decimal::new(50, 0), Decimal::new(100, 0)), Decimal::new(550, 0));
/// assert_eq!(matrix.get_oda_charge(Decimal::new(51, 0), Decimal::new(100, 0)), Decimal::new(825, 0));
/// assert_eq!(matrix.get_oda_charge(Decimal::ZERO, Decimal::new(100, 0)), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OdaChargeMatrix {
    bands: Vec<DistanceBand>,
}

impl OdaChargeMatrix {
    /// Builds a matrix, validating its shape.
    ///
    /// Requires at least one band, each with at least one bracket; bands
    /// ascending and non-overlapping with `min_km <= max_km`; bracket
    /// ceilings strictly ascending; charges between zero and
    /// [`MAX_CONFIG_AMOUNT`]; no negative values.
    pub fn new(bands: Vec<DistanceBand>) -> EngineResult<Self> {
        if bands.is_empty() {
            return Err(invalid_matrix("at least one distance band is required"));
        }

        let mut previous_max: Option<Decimal> = None;
        for band in &bands {
            if band.min_km < Decimal::ZERO || band.min_km > band.max_km {
                return Err(invalid_matrix(format!(
                    "band {}-{} km has invalid bounds",
                    band.min_km, band.max_km
                )));
            }
            if let Some(prev) = previous_max {
                if band.min_km <= prev {
                    return Err(invalid_matrix(format!(
                        "band {}-{} km overlaps or precedes the previous band",
                        band.min_km, band.max_km
                    )));
                }
            }
            previous_max = Some(band.max_km);

            if band.brackets.is_empty() {
                return Err(invalid_matrix(format!(
                    "band {}-{} km has no weight brackets",
                    band.min_km, band.max_km
                )));
            }
            let ascending = band
                .brackets
                .windows(2)
                .all(|pair| pair[0].max_weight_kg < pair[1].max_weight_kg);
            let non_negative = band
                .brackets
                .iter()
                .all(|b| b.max_weight_kg >= Decimal::ZERO && b.charge >= Decimal::ZERO);
            let charges_bounded = band.brackets.iter().all(|b| b.charge <= MAX_CONFIG_AMOUNT);
            if !ascending || !non_negative || !charges_bounded {
                return Err(invalid_matrix(format!(
                    "band {}-{} km brackets must be non-negative with ascending ceilings and bounded charges",
                    band.min_km, band.max_km
                )));
            }
        }

        Ok(Self { bands })
    }

    /// Returns the built-in matrix from the standard rate card.
    pub fn standard() -> Self {
        let bands = STANDARD_BANDS
            .iter()
            .map(|(min_km, max_km, brackets)| DistanceBand {
                min_km: Decimal::from(*min_km),
                max_km: Decimal::from(*max_km),
                brackets: brackets
                    .iter()
                    .map(|(max_weight, charge)| WeightBracket {
                        max_weight_kg: Decimal::from(*max_weight),
                        charge: Decimal::from(*charge),
                    })
                    .collect(),
            })
            .collect();
        Self { bands }
    }

    /// Returns the distance bands in ascending order.
    pub fn bands(&self) -> &[DistanceBand] {
        &self.bands
    }

    /// Looks up the ODA charge for a distance and weight.
    ///
    /// A non-positive distance means no ODA distance was recorded and yields
    /// zero. A distance inside a band uses that band. A distance below the
    /// first band or in a gap between bands uses the next band up, and a
    /// distance beyond the last band uses the last band. Within the band the
    /// first bracket whose ceiling the weight does not exceed applies;
    /// heavier shipments take the last bracket.
    pub fn get_oda_charge(&self, distance_km: Decimal, weight_kg: Decimal) -> Decimal {
        if distance_km <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.select_band(distance_km)
            .map(|band| band.charge_for(weight_kg))
            .unwrap_or(Decimal::ZERO)
    }

    fn select_band(&self, distance_km: Decimal) -> Option<&DistanceBand> {
        self.bands
            .iter()
            .find(|band| band.contains(distance_km))
            .or_else(|| self.bands.iter().find(|band| distance_km <= band.max_km))
            .or_else(|| self.bands.last())
    }
}

impl Default for OdaChargeMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid_matrix(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfiguration {
        subject: "oda_matrix".to_string(),
        message: message.into(),
    }
}

/// The result of an ODA surcharge calculation.
#[derive(Debug, Clone)]
pub struct OdaSurchargeResult {
    /// The surcharge amount (zero for serviceable destinations).
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies the fixed ODA fee to out-of-delivery-area destinations.
pub fn calculate_fixed_oda(
    record: &DestinationRecord,
    oda_fixed: Decimal,
    step_number: u32,
) -> OdaSurchargeResult {
    let applies = record.status.is_oda();
    let amount = if applies { oda_fixed } else { Decimal::ZERO };

    let reasoning = if applies {
        format!("ODA destination: fixed surcharge {}", oda_fixed)
    } else {
        "Serviceable destination: no ODA surcharge".to_string()
    };

    OdaSurchargeResult {
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "oda_fixed".to_string(),
            rule_name: "Fixed ODA Surcharge".to_string(),
            input: serde_json::json!({
                "status": record.status.as_str(),
                "oda_fixed": oda_fixed.to_string()
            }),
            output: serde_json::json!({
                "oda": amount.to_string(),
                "applied": applies
            }),
            reasoning,
        },
    }
}

/// Looks up the matrix ODA charge for out-of-delivery-area destinations.
pub fn calculate_matrix_oda(
    record: &DestinationRecord,
    weight_kg: Decimal,
    matrix: &OdaChargeMatrix,
    step_number: u32,
) -> OdaSurchargeResult {
    let applies = record.status.is_oda();
    let amount = if applies {
        matrix.get_oda_charge(record.oda_distance, weight_kg)
    } else {
        Decimal::ZERO
    };

    let reasoning = if !applies {
        "Serviceable destination: no ODA surcharge".to_string()
    } else if record.oda_distance <= Decimal::ZERO {
        "ODA destination without a recorded distance: no matrix surcharge".to_string()
    } else {
        format!(
            "ODA matrix charge for {} km at {} kg: {}",
            record.oda_distance, weight_kg, amount
        )
    };

    OdaSurchargeResult {
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "oda_matrix".to_string(),
            rule_name: "Matrix ODA Surcharge".to_string(),
            input: serde_json::json!({
                "status": record.status.as_str(),
                "oda_distance": record.oda_distance.to_string(),
                "weight": weight_kg.to_string()
            }),
            output: serde_json::json!({
                "oda": amount.to_string(),
                "applied": applies
            }),
            reasoning,
        },
    }
}
