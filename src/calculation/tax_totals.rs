//! Minimum charge, GST and total aggregation.
//!
//! This module combines the individual charges into the pre-tax subtotal,
//! applies the minimum-charge floor and the fuel surcharge, then GST. All
//! arithmetic here is unrounded; rounding to two decimal places happens once
//! when [`PriceTotals::rounded`] produces the itemized breakdown.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::CourierConfig;
use crate::models::{AuditStep, CostBreakdown};

use super::fuel_surcharge::calculate_fuel;

/// Number of decimal places in displayed and stored amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds a monetary amount to two decimal places, halves away from zero.
///
/// # Examples
///
/// ```
/// use courier_quote_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("274.275").unwrap()), Decimal::from_str("274.28").unwrap());
/// assert_eq!(round_money(Decimal::from_str("61.452").unwrap()), Decimal::from_str("61.45").unwrap());
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// The pre-fuel charges a quote is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeComponents {
    /// Freight amount.
    pub freight: Decimal,
    /// Docket fee.
    pub docket: Decimal,
    /// Insurance charge.
    pub insurance: Decimal,
    /// ODA surcharge.
    pub oda: Decimal,
}

impl ChargeComponents {
    /// Sum of all pre-fuel charges.
    pub fn sum(&self) -> Decimal {
        self.freight + self.docket + self.insurance + self.oda
    }
}

/// Unrounded totals of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTotals {
    /// Freight amount.
    pub freight: Decimal,
    /// Fuel surcharge.
    pub fuel: Decimal,
    /// Insurance charge.
    pub insurance: Decimal,
    /// ODA surcharge.
    pub oda: Decimal,
    /// Docket fee.
    pub docket: Decimal,
    /// Pre-fuel subtotal after the minimum-charge floor.
    pub subtotal_pre_fuel: Decimal,
    /// Subtotal the GST applies to (pre-fuel subtotal plus fuel).
    pub subtotal_for_tax: Decimal,
    /// GST amount.
    pub gst: Decimal,
    /// Total payable.
    pub total: Decimal,
}

impl PriceTotals {
    /// Rounds every field once for output.
    ///
    /// The rounded total is the rounded subtotal plus the rounded GST, so
    /// the breakdown always adds up exactly.
    pub fn rounded(&self) -> CostBreakdown {
        let subtotal = round_money(self.subtotal_for_tax);
        let gst = round_money(self.gst);
        CostBreakdown {
            freight: round_money(self.freight),
            fuel: round_money(self.fuel),
            insurance: round_money(self.insurance),
            oda: round_money(self.oda),
            docket: round_money(self.docket),
            subtotal_pre_fuel: round_money(self.subtotal_pre_fuel),
            subtotal,
            gst,
            total: subtotal + gst,
        }
    }
}

/// The result of aggregating a quote's totals, with one audit step per stage.
#[derive(Debug, Clone)]
pub struct TotalsResult {
    /// The unrounded totals.
    pub totals: PriceTotals,
    /// Audit steps for the minimum charge, fuel and GST stages.
    pub audit_steps: Vec<AuditStep>,
}

/// Aggregates charges into the final totals.
///
/// 1. `subtotal_pre_fuel = freight + docket + insurance + oda`
/// 2. floor it at the courier's minimum charge
/// 3. fuel on the courier's fuel basis
/// 4. `subtotal_for_tax = subtotal_pre_fuel + fuel`
/// 5. `gst = subtotal_for_tax * gst_pct / 100`
/// 6. `total = subtotal_for_tax + gst`
pub fn aggregate_totals(
    components: &ChargeComponents,
    config: &CourierConfig,
    step_number: u32,
) -> TotalsResult {
    let mut step_number = step_number;
    let mut audit_steps = Vec::with_capacity(3);

    let raw_subtotal = components.sum();
    let floor_applied = raw_subtotal < config.min_charge;
    let subtotal_pre_fuel = if floor_applied {
        config.min_charge
    } else {
        raw_subtotal
    };

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "minimum_charge".to_string(),
        rule_name: "Minimum Charge".to_string(),
        input: serde_json::json!({
            "freight": components.freight.to_string(),
            "docket": components.docket.to_string(),
            "insurance": components.insurance.to_string(),
            "oda": components.oda.to_string(),
            "min_charge": config.min_charge.to_string()
        }),
        output: serde_json::json!({
            "subtotal_pre_fuel": subtotal_pre_fuel.to_string(),
            "floor_applied": floor_applied
        }),
        reasoning: if floor_applied {
            format!(
                "Charges {} below minimum {}, raised to minimum",
                raw_subtotal, config.min_charge
            )
        } else {
            format!("Charges {} meet minimum {}", raw_subtotal, config.min_charge)
        },
    });
    step_number += 1;

    let fuel = calculate_fuel(
        config.fuel_basis,
        config.fuel_pct,
        components.freight,
        config.min_charge,
        subtotal_pre_fuel,
        step_number,
    );
    audit_steps.push(fuel.audit_step);
    step_number += 1;

    let subtotal_for_tax = subtotal_pre_fuel + fuel.fuel;
    let gst = subtotal_for_tax * config.gst_pct / Decimal::ONE_HUNDRED;
    let total = subtotal_for_tax + gst;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "gst".to_string(),
        rule_name: "GST".to_string(),
        input: serde_json::json!({
            "subtotal": subtotal_for_tax.to_string(),
            "gst_pct": config.gst_pct.to_string()
        }),
        output: serde_json::json!({
            "gst": gst.to_string(),
            "total": total.to_string()
        }),
        reasoning: format!(
            "{} + {}% GST ({}) = {}",
            subtotal_for_tax, config.gst_pct, gst, total
        ),
    });

    TotalsResult {
        totals: PriceTotals {
            freight: components.freight,
            fuel: fuel.fuel,
            insurance: components.insurance,
            oda: components.oda,
            docket: components.docket,
            subtotal_pre_fuel,
            subtotal_for_tax,
            gst,
            total,
        },
        audit_steps,
    }
}
