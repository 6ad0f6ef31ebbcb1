//! Insurance charge calculation.
//!
//! Insurance is the greater of a percentage of the declared value and a flat
//! minimum fee. The two are never added together.

use rust_decimal::Decimal;

use crate::models::AuditStep;

/// The result of an insurance calculation, including the amount and audit step.
#[derive(Debug, Clone)]
pub struct InsuranceResult {
    /// The insurance charge.
    pub amount: Decimal,
    /// True when the flat fee was greater than the percentage amount.
    pub flat_applied: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates insurance as `max(declared_value * pct / 100, flat)`.
///
/// # Examples
///
/// ```
/// use courier_quote_engine::calculation::calculate_insurance;
/// use rust_decimal::Decimal;
///
/// // 2% of 1000 = 20 beats a zero flat fee
/// let result = calculate_insurance(Decimal::new(1000, 0), Decimal::new(2, 0), Decimal::ZERO, 1);
/// assert_eq!(result.amount, Decimal::new(20, 0));
///
/// // a flat fee of 100 beats 2% of 1000
/// let result = calculate_insurance(Decimal::new(1000, 0), Decimal::new(2, 0), Decimal::new(100, 0), 1);
/// assert_eq!(result.amount, Decimal::new(100, 0));
/// ```
pub fn calculate_insurance(
    declared_value: Decimal,
    insurance_pct: Decimal,
    insurance_flat: Decimal,
    step_number: u32,
) -> InsuranceResult {
    let percentage_amount = declared_value * insurance_pct / Decimal::ONE_HUNDRED;
    let flat_applied = insurance_flat > percentage_amount;
    let amount = if flat_applied {
        insurance_flat
    } else {
        percentage_amount
    };

    let reasoning = if flat_applied {
        format!(
            "Flat insurance {} exceeds {}% of {} ({})",
            insurance_flat, insurance_pct, declared_value, percentage_amount
        )
    } else {
        format!(
            "{}% of declared value {} = {} (flat fee {})",
            insurance_pct, declared_value, percentage_amount, insurance_flat
        )
    };

    InsuranceResult {
        amount,
        flat_applied,
        audit_step: AuditStep {
            step_number,
            rule_id: "insurance".to_string(),
            rule_name: "Insurance".to_string(),
            input: serde_json::json!({
                "declared_value": declared_value.to_string(),
                "insurance_pct": insurance_pct.to_string(),
                "insurance_flat": insurance_flat.to_string()
            }),
            output: serde_json::json!({
                "insurance": amount.to_string(),
                "flat_applied": flat_applied
            }),
            reasoning,
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
    fn test_percentage_wins_when_greater() {
        let result = calculate_insurance(dec("10000"), dec("1.5"), dec("50"), 1);
        assert_eq!(result.amount, dec("150"));
        assert!(!result.flat_applied);
    }

    #[test]
    fn test_flat_fee_wins_when_greater() {
        let result = calculate_insurance(dec("1000"), dec("1.5"), dec("50"), 1);
        assert_eq!(result.amount, dec("50"));
        assert!(result.flat_applied);
        assert_eq!(
            result.audit_step.output["flat_applied"],
            serde_json::json!(true)
        );
    }

    #[test]
    fn test_components_are_not_summed() {
        let result = calculate_insurance(dec("1000"), dec("2"), dec("20"), 1);
        assert_eq!(result.amount, dec("20"));
    }

    #[test]
    fn test_zero_declared_value_uses_flat_fee() {
        let result = calculate_insurance(Decimal::ZERO, dec("2"), dec("100"), 1);
        assert_eq!(result.amount, dec("100"));
    }

    #[test]
    fn test_no_insurance_configured_is_zero() {
        let result = calculate_insurance(dec("5000"), Decimal::ZERO, Decimal::ZERO, 7);
        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.rule_id, "insurance");
    }
}
