//! Pricing engine dispatch.
//!
//! This module selects the pricing strategy for a courier and runs the
//! pipeline: reference lookup, rate resolution, freight, insurance, ODA,
//! then the minimum charge, fuel and GST aggregation. Every stage appends an
//! [`AuditStep`] to the result's trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CourierConfig, OdaPolicy};
use crate::error::EngineResult;
use crate::models::{AuditStep, DestinationRecord, QuoteResult, Rejection, ShipmentRequest};

use super::insurance::calculate_insurance;
use super::oda_surcharge::{
    OdaChargeMatrix, OdaSurchargeResult, calculate_fixed_oda, calculate_matrix_oda,
};
use super::rate_resolver::{calculate_freight, resolve_rate};
use super::tax_totals::{ChargeComponents, aggregate_totals};

/// The pricing pipeline variant used for a courier.
///
/// The variants differ only in how the ODA surcharge is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    /// Fixed ODA fee.
    Generic,
    /// Distance/weight matrix ODA charge.
    SpecialOda,
}

impl PricingStrategy {
    /// Selects the strategy from the courier's ODA policy.
    pub fn for_courier(config: &CourierConfig) -> Self {
        match config.oda_type {
            OdaPolicy::Fixed => PricingStrategy::Generic,
            OdaPolicy::Special => PricingStrategy::SpecialOda,
        }
    }

    /// Returns the strategy's name as used in logs and audit steps.
    pub fn name(&self) -> &'static str {
        match self {
            PricingStrategy::Generic => "generic",
            PricingStrategy::SpecialOda => "special_oda",
        }
    }

    /// Quotes one shipment to one destination with one courier.
    ///
    /// `record` is the courier's reference row for `pincode`, or `None` when
    /// the pincode is unknown to the courier. Unknown pincodes and zones
    /// without a rate produce a rejected [`QuoteResult`], not an error; the
    /// only error is a shipment that violates the input contract.
    pub fn quote(
        &self,
        config: &CourierConfig,
        pincode: &str,
        record: Option<&DestinationRecord>,
        shipment: &ShipmentRequest,
        matrix: &OdaChargeMatrix,
    ) -> EngineResult<QuoteResult> {
        shipment.validate()?;

        let weight = shipment.effective_weight();
        let mut audit_trace: Vec<AuditStep> = Vec::new();
        let mut step_number: u32 = 1;

        audit_trace.push(chargeable_weight_step(shipment, weight, step_number));
        step_number += 1;

        audit_trace.push(pincode_lookup_step(pincode, record, step_number));
        step_number += 1;

        let Some(record) = record else {
            return Ok(QuoteResult::rejected(
                &config.name,
                pincode,
                weight,
                None,
                Rejection::PincodeNotFound,
                audit_trace,
            ));
        };

        let Some(rate) = resolve_rate(config, &record.zone, step_number) else {
            audit_trace.push(missing_rate_step(config, &record.zone, step_number));
            return Ok(QuoteResult::rejected(
                &config.name,
                pincode,
                weight,
                Some(record),
                Rejection::ZoneRateMissing {
                    zone: record.zone.clone(),
                },
                audit_trace,
            ));
        };
        audit_trace.push(rate.audit_step);
        step_number += 1;

        let freight = calculate_freight(rate.rate_per_kg, weight, step_number);
        audit_trace.push(freight.audit_step);
        step_number += 1;

        let insurance = calculate_insurance(
            shipment.declared_value,
            config.insurance_pct,
            config.insurance_flat,
            step_number,
        );
        audit_trace.push(insurance.audit_step);
        step_number += 1;

        let oda = self.oda_surcharge(config, record, weight, matrix, step_number);
        audit_trace.push(oda.audit_step);
        step_number += 1;

        let components = ChargeComponents {
            freight: freight.freight,
            docket: config.docket,
            insurance: insurance.amount,
            oda: oda.amount,
        };
        let totals = aggregate_totals(&components, config, step_number);
        audit_trace.extend(totals.audit_steps);

        let breakdown = totals.totals.rounded();
        debug!(
            courier = %config.name,
            pincode = %pincode,
            strategy = self.name(),
            total = %breakdown.total,
            "Quote priced"
        );

        Ok(QuoteResult::quoted(
            &config.name,
            pincode,
            weight,
            record,
            rate.rate_per_kg,
            breakdown,
            audit_trace,
        ))
    }

    fn oda_surcharge(
        &self,
        config: &CourierConfig,
        record: &DestinationRecord,
        weight: Decimal,
        matrix: &OdaChargeMatrix,
        step_number: u32,
    ) -> OdaSurchargeResult {
        match self {
            PricingStrategy::Generic => calculate_fixed_oda(record, config.oda_fixed, step_number),
            PricingStrategy::SpecialOda => calculate_matrix_oda(record, weight, matrix, step_number),
        }
    }
}

/// Quotes a shipment with the strategy selected for the courier.
///
/// # Example
///
/// ```
/// use courier_quote_engine::calculation::{OdaChargeMatrix, quote_courier};
/// use courier_quote_engine::config::CourierConfigInput;
/// use courier_quote_engine::models::ShipmentRequest;
/// use rust_decimal::Decimal;
///
/// let config = serde_yaml::from_str::<CourierConfigInput>("name: XP\nrates: '{\"A\": 25}'")
///     .unwrap()
///     .into_config()
///     .unwrap();
/// let shipment = ShipmentRequest::new(Decimal::new(2, 0), Decimal::ZERO);
///
/// let result = quote_courier(&config, "560001", None, &shipment, &OdaChargeMatrix::standard()).unwrap();
/// assert_eq!(result.reason, "Pincode not found");
/// ```
pub fn quote_courier(
    config: &CourierConfig,
    pincode: &str,
    record: Option<&DestinationRecord>,
    shipment: &ShipmentRequest,
    matrix: &OdaChargeMatrix,
) -> EngineResult<QuoteResult> {
    PricingStrategy::for_courier(config).quote(config, pincode, record, shipment, matrix)
}

fn chargeable_weight_step(shipment: &ShipmentRequest, weight: Decimal, step_number: u32) -> AuditStep {
    let volumetric = shipment.volumetric_weight.map(|v| v.to_string());
    AuditStep {
        step_number,
        rule_id: "chargeable_weight".to_string(),
        rule_name: "Chargeable Weight".to_string(),
        input: serde_json::json!({
            "actual_weight": shipment.actual_weight.to_string(),
            "volumetric_weight": volumetric
        }),
        output: serde_json::json!({
            "weight": weight.to_string()
        }),
        reasoning: match shipment.volumetric_weight {
            Some(v) if !v.is_zero() => format!(
                "Greater of actual {} kg and volumetric {} kg = {} kg",
                shipment.actual_weight, v, weight
            ),
            _ => format!("Actual weight {} kg", weight),
        },
    }
}

fn pincode_lookup_step(pincode: &str, record: Option<&DestinationRecord>, step_number: u32) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "pincode_lookup".to_string(),
        rule_name: "Pincode Lookup".to_string(),
        input: serde_json::json!({
            "pincode": pincode
        }),
        output: match record {
            Some(r) => serde_json::json!({
                "found": true,
                "zone": r.zone,
                "status": r.status.as_str(),
                "oda_distance": r.oda_distance.to_string()
            }),
            None => serde_json::json!({ "found": false }),
        },
        reasoning: match record {
            Some(r) => format!("Pincode {} is zone '{}' ({})", pincode, r.zone, r.status.as_str()),
            None => format!("Pincode {} not in reference table", pincode),
        },
    }
}

fn missing_rate_step(config: &CourierConfig, zone: &str, step_number: u32) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "rate_lookup".to_string(),
        rule_name: "Zone Rate Lookup".to_string(),
        input: serde_json::json!({
            "courier": config.name,
            "zone": zone
        }),
        output: serde_json::json!({
            "rate_per_kg": null
        }),
        reasoning: format!("No rate for zone '{}' and no generic rate", zone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CourierConfigInput;
    use crate::models::{DeliveryStatus, MAX_SHIPMENT_AMOUNT};
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config(yaml: &str) -> CourierConfig {
        serde_yaml::from_str::<CourierConfigInput>(yaml)
            .unwrap()
            .into_config()
            .unwrap()
    }

    fn record(zone: &str, status: DeliveryStatus, distance: &str) -> DestinationRecord {
        DestinationRecord {
            pincode: "788001".to_string(),
            zone: zone.to_string(),
            status,
            state: "Assam".to_string(),
            location: "Silchar".to_string(),
            oda_distance: dec(distance),
        }
    }

    fn shipment(weight: &str, declared: &str) -> ShipmentRequest {
        ShipmentRequest::new(dec(weight), dec(declared))
    }

    #[test]
    fn test_strategy_follows_oda_policy() {
        assert_eq!(
            PricingStrategy::for_courier(&config("name: A\noda_type: Fixed")),
            PricingStrategy::Generic
        );
        assert_eq!(
            PricingStrategy::for_courier(&config("name: B\noda_type: Special")),
            PricingStrategy::SpecialOda
        );
    }

    #[test]
    fn test_end_to_end_fixed_oda_quote() {
        let config = config(
            "name: XP\nrates: '{\"A\": 20}'\ndocket: 50\nfuel_pct: 10\ninsurance_pct: 2\noda_type: Fixed\noda_fixed: 150\ngst_pct: 18",
        );
        let record = record("A", DeliveryStatus::OutOfDeliveryArea, "0");
        let result = quote_courier(
            &config,
            "788001",
            Some(&record),
            &shipment("10", "1000"),
            &OdaChargeMatrix::standard(),
        )
        .unwrap();

        assert!(result.is_ok());
        let breakdown = result.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.freight, dec("200"));
        assert_eq!(breakdown.insurance, dec("20"));
        assert_eq!(breakdown.oda, dec("150"));
        assert_eq!(breakdown.docket, dec("50"));
        assert_eq!(breakdown.subtotal_pre_fuel, dec("420"));
        assert_eq!(breakdown.fuel, dec("20"));
        assert_eq!(breakdown.subtotal, dec("440"));
        assert_eq!(breakdown.gst, dec("79.2"));
        assert_eq!(breakdown.total, dec("519.2"));
        assert_eq!(result.zone_rate, Some(dec("20")));
        assert_eq!(result.location, "Silchar");
    }

    #[test]
    fn test_audit_trace_is_numbered_sequentially() {
        let config = config("name: XP\nrates: '{\"A\": 20}'");
        let record = record("A", DeliveryStatus::Serviceable, "0");
        let result = quote_courier(
            &config,
            "110001",
            Some(&record),
            &shipment("1", "0"),
            &OdaChargeMatrix::standard(),
        )
        .unwrap();

        let ids: Vec<&str> = result.audit_trace.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "chargeable_weight",
                "pincode_lookup",
                "rate_lookup",
                "freight",
                "insurance",
                "oda_fixed",
                "minimum_charge",
                "fuel_surcharge",
                "gst"
            ]
        );
        for (index, step) in result.audit_trace.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
    }

    #[test]
    fn test_special_oda_uses_matrix() {
        let config = config("name: BD\nrates: '{\"C\": 10}'\noda_type: Special\ngst_pct: 0");
        let record = record("C", DeliveryStatus::OutOfDeliveryArea, "75");
        let result = quote_courier(
            &config,
            "788001",
            Some(&record),
            &shipment("10", "0"),
            &OdaChargeMatrix::standard(),
        )
        .unwrap();

        let breakdown = result.breakdown.unwrap();
        assert_eq!(breakdown.oda, dec("825"));
        assert_eq!(result.audit_trace[5].rule_id, "oda_matrix");
    }

    #[test]
    fn test_serviceable_destination_has_no_oda() {
        let config = config("name: BD\nrates: '{\"C\": 10}'\noda_type: Special");
        let record = record("C", DeliveryStatus::Serviceable, "75");
        let result = quote_courier(
            &config,
            "788001",
            Some(&record),
            &shipment("10", "0"),
            &OdaChargeMatrix::standard(),
        )
        .unwrap();
        assert_eq!(result.breakdown.unwrap().oda, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_pincode_is_rejected() {
        let config = config("name: XP\nrates: '{\"A\": 20}'");
        let result = quote_courier(
            &config,
            "000000",
            None,
            &shipment("1", "0"),
            &OdaChargeMatrix::standard(),
        )
        .unwrap();

        assert_eq!(result.reason, "Pincode not found");
        assert!(result.breakdown.is_none());
        assert_eq!(result.audit_trace.len(), 2);
    }

    #[test]
    fn test_missing_zone_rate_is_rejected_without_numbers() {
        let config = config("name: XP\nrates: '{\"A\": 25}'");
        let record = record("B", DeliveryStatus::Serviceable, "0");
        let result = quote_courier(
            &config,
            "400001",
            Some(&record),
            &shipment("1", "0"),
            &OdaChargeMatrix::standard(),
        )
        .unwrap();

        assert_eq!(result.reason, "Rate missing for zone B");
        assert!(result.breakdown.is_none());
        assert!(result.zone_rate.is_none());
        assert_eq!(result.zone, "B");
    }

    #[test]
    fn test_volumetric_weight_drives_freight() {
        let config = config("name: XP\nrates: '{\"A\": 10}'\ngst_pct: 0");
        let record = record("A", DeliveryStatus::Serviceable, "0");
        let mut shipment = shipment("2", "0");
        shipment.volumetric_weight = Some(dec("5"));

        let result = quote_courier(
            &config,
            "110001",
            Some(&record),
            &shipment,
            &OdaChargeMatrix::standard(),
        )
        .unwrap();
        assert_eq!(result.weight, dec("5"));
        assert_eq!(result.breakdown.unwrap().freight, dec("50"));
    }

    #[test]
    fn test_negative_weight_is_an_error() {
        let config = config("name: XP\nrates: '{\"A\": 10}'");
        let result = quote_courier(
            &config,
            "110001",
            None,
            &shipment("-1", "0"),
            &OdaChargeMatrix::standard(),
        );
        assert!(matches!(result, Err(EngineError::InvalidShipment { .. })));
    }

    #[test]
    fn test_oversized_declared_value_is_an_error() {
        let config = config("name: XP\nrates: '{\"A\": 10}'\ninsurance_pct: 2");
        let record = record("A", DeliveryStatus::Serviceable, "0");
        let shipment = ShipmentRequest::new(dec("1"), Decimal::MAX);

        let result = quote_courier(
            &config,
            "110001",
            Some(&record),
            &shipment,
            &OdaChargeMatrix::standard(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidShipment { field, .. }) if field == "declared_value"
        ));
    }

    #[test]
    fn test_largest_inputs_price_without_overflow() {
        let config = config(
            "name: Big\nrates: '{\"A\": 1000000000}'\ndocket: 1000000000\nfuel_pct: 1000\nfuel_basis: subtotal\ninsurance_pct: 1000\noda_type: Fixed\noda_fixed: 1000000000\ngst_pct: 1000\nmin_charge: 1000000000",
        );
        let record = record("A", DeliveryStatus::OutOfDeliveryArea, "0");
        let shipment = ShipmentRequest::new(MAX_SHIPMENT_AMOUNT, MAX_SHIPMENT_AMOUNT);

        let result = quote_courier(
            &config,
            "110001",
            Some(&record),
            &shipment,
            &OdaChargeMatrix::standard(),
        )
        .unwrap();
        assert!(result.is_ok());
        assert!(result.total().unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_identical_inputs_give_identical_results() {
        let config = config("name: XP\nrates: '{\"A\": 22.5}'\nfuel_pct: 12.5\ninsurance_pct: 1.5");
        let record = record("A", DeliveryStatus::Serviceable, "0");
        let matrix = OdaChargeMatrix::standard();

        let first = quote_courier(&config, "110001", Some(&record), &shipment("3.3", "777"), &matrix).unwrap();
        let second = quote_courier(&config, "110001", Some(&record), &shipment("3.3", "777"), &matrix).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
