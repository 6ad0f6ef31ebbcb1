//! Rate resolution and freight calculation.
//!
//! This module determines the per-kg rate a courier charges for a zone and
//! turns it into the freight amount for a shipment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CourierConfig, normalize_zone};
use crate::models::AuditStep;

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSourceKind {
    /// The courier's rate for the destination zone.
    Zone,
    /// The courier's generic per-kg fallback rate.
    Fallback,
}

/// The result of a successful rate lookup, including the rate and audit step.
#[derive(Debug, Clone)]
pub struct RateLookupResult {
    /// The per-kg rate to charge.
    pub rate_per_kg: Decimal,
    /// Whether the rate is zone-specific or the fallback.
    pub source: RateSourceKind,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Resolves the per-kg rate for a zone.
///
/// Priority:
/// 1. the zone's rate, when the zone is non-empty and present in the table
/// 2. the courier's generic `rate_per_kg`, when configured
///
/// Returns `None` when neither exists. The caller turns that into a
/// "Rate missing for zone" rejection; no rate is guessed.
///
/// # Examples
///
/// ```
/// use courier_quote_engine::calculation::resolve_rate;
/// use courier_quote_engine::config::CourierConfigInput;
/// use rust_decimal::Decimal;
///
/// let config = serde_yaml::from_str::<CourierConfigInput>("name: XP\nrates: '{\"A\": 25}'")
///     .unwrap()
///     .into_config()
///     .unwrap();
///
/// assert_eq!(resolve_rate(&config, "a", 1).unwrap().rate_per_kg, Decimal::new(25, 0));
/// assert!(resolve_rate(&config, "B", 1).is_none());
/// ```
pub fn resolve_rate(
    config: &CourierConfig,
    zone: &str,
    step_number: u32,
) -> Option<RateLookupResult> {
    let zone = normalize_zone(zone);

    let zone_rate = if zone.is_empty() {
        None
    } else {
        config.rates.get(&zone)
    };

    let (rate_per_kg, source) = match (zone_rate, config.rate_per_kg) {
        (Some(rate), _) => (rate, RateSourceKind::Zone),
        (None, Some(fallback)) => (fallback, RateSourceKind::Fallback),
        (None, None) => return None,
    };

    let reasoning = match source {
        RateSourceKind::Zone => format!("Zone '{}' rate: {} per kg", zone, rate_per_kg),
        RateSourceKind::Fallback => format!(
            "No rate for zone '{}', using generic rate {} per kg",
            zone, rate_per_kg
        ),
    };

    Some(RateLookupResult {
        rate_per_kg,
        source,
        audit_step: AuditStep {
            step_number,
            rule_id: "rate_lookup".to_string(),
            rule_name: "Zone Rate Lookup".to_string(),
            input: serde_json::json!({
                "courier": config.name,
                "zone": zone
            }),
            output: serde_json::json!({
                "rate_per_kg": rate_per_kg.to_string(),
                "source": source
            }),
            reasoning,
        },
    })
}

/// The result of a freight calculation.
#[derive(Debug, Clone)]
pub struct FreightResult {
    /// Rate per kg times chargeable weight.
    pub freight: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates freight as rate per kg times chargeable weight.
pub fn calculate_freight(rate_per_kg: Decimal, weight_kg: Decimal, step_number: u32) -> FreightResult {
    let freight = rate_per_kg * weight_kg;

    FreightResult {
        freight,
        audit_step: AuditStep {
            step_number,
            rule_id: "freight".to_string(),
            rule_name: "Freight".to_string(),
            input: serde_json::json!({
                "rate_per_kg": rate_per_kg.to_string(),
                "weight": weight_kg.to_string()
            }),
            output: serde_json::json!({
                "freight": freight.to_string()
            }),
            reasoning: format!("{} per kg x {} kg = {}", rate_per_kg, weight_kg, freight),
        },
    }
}
