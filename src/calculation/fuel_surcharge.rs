//! Fuel surcharge calculation.
//!
//! The fuel percentage applies to a per-courier basis: freight alone, or the
//! floored pre-fuel subtotal.

use rust_decimal::Decimal;

use crate::config::FuelBasis;
use crate::models::AuditStep;

/// The result of a fuel surcharge calculation.
#[derive(Debug, Clone)]
pub struct FuelResult {
    /// The fuel surcharge.
    pub fuel: Decimal,
    /// The amount the percentage was applied to.
    pub fuel_base: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the fuel surcharge.
///
/// With [`FuelBasis::Freight`] the base is the freight, or the minimum
/// charge when freight is zero. With [`FuelBasis::Subtotal`] the base is the
/// pre-fuel subtotal, which the caller has already floored at the minimum
/// charge.
///
/// # Examples
///
/// ```
/// use courier_quote_engine::calculation::calculate_fuel;
/// use courier_quote_engine::config::FuelBasis;
/// use rust_decimal::Decimal;
///
/// let freight = Decimal::new(100, 0);
/// let subtotal = Decimal::new(125, 0);
/// let pct = Decimal::new(10, 0);
///
/// let on_freight = calculate_fuel(FuelBasis::Freight, pct, freight, Decimal::ZERO, subtotal, 1);
/// assert_eq!(on_freight.fuel, Decimal::new(10, 0));
///
/// let on_subtotal = calculate_fuel(FuelBasis::Subtotal, pct, freight, Decimal::ZERO, subtotal, 1);
/// assert_eq!(on_subtotal.fuel, Decimal::new(125, 1));
/// ```
pub fn calculate_fuel(
    basis: FuelBasis,
    fuel_pct: Decimal,
    freight: Decimal,
    min_charge: Decimal,
    subtotal_pre_fuel: Decimal,
    step_number: u32,
) -> FuelResult {
    let fuel_base = match basis {
        FuelBasis::Freight if freight > Decimal::ZERO => freight,
        FuelBasis::Freight => min_charge,
        FuelBasis::Subtotal => subtotal_pre_fuel,
    };
    let fuel = fuel_base * fuel_pct / Decimal::ONE_HUNDRED;

    FuelResult {
        fuel,
        fuel_base,
        audit_step: AuditStep {
            step_number,
            rule_id: "fuel_surcharge".to_string(),
            rule_name: "Fuel Surcharge".to_string(),
            input: serde_json::json!({
                "fuel_basis": basis.to_string(),
                "fuel_pct": fuel_pct.to_string(),
                "fuel_base": fuel_base.to_string()
            }),
            output: serde_json::json!({
                "fuel": fuel.to_string()
            }),
            reasoning: format!("{}% of {} basis {} = {}", fuel_pct, basis, fuel_base, fuel),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_freight_basis_uses_freight() {
        let result = calculate_fuel(FuelBasis::Freight, dec("10"), dec("100"), dec("0"), dec("125"), 1);
        assert_eq!(result.fuel, dec("10"));
        assert_eq!(result.fuel_base, dec("100"));
    }

    #[test]
    fn test_subtotal_basis_uses_pre_fuel_subtotal() {
        // freight 100 + docket 20 + insurance 5 + oda 0
        let result = calculate_fuel(FuelBasis::Subtotal, dec("10"), dec("100"), dec("0"), dec("125"), 1);
        assert_eq!(result.fuel, dec("12.5"));
        assert_eq!(result.audit_step.input["fuel_basis"], serde_json::json!("subtotal"));
    }

    #[test]
    fn test_zero_freight_falls_back_to_minimum_charge() {
        let result = calculate_fuel(FuelBasis::Freight, dec("10"), Decimal::ZERO, dec("300"), dec("300"), 1);
        assert_eq!(result.fuel_base, dec("300"));
        assert_eq!(result.fuel, dec("30"));
    }

    #[test]
    fn test_zero_percentage_has_no_fuel() {
        let result = calculate_fuel(FuelBasis::Subtotal, Decimal::ZERO, dec("100"), dec("0"), dec("125"), 1);
        assert_eq!(result.fuel, Decimal::ZERO);
    }
}
