//! Configuration types for courier pricing.
//!
//! This module contains the strongly-typed [`CourierConfig`] used by the
//! pricing pipeline and the looser [`CourierConfigInput`] shape that is
//! deserialized from YAML files and API bodies and validated into it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Rate-table key that carries a generic per-kg rate instead of a zone rate.
pub const GENERIC_RATE_KEY: &str = "RATE_PER_KG";

/// Largest accepted rate, fee or matrix charge: 10^9.
pub const MAX_CONFIG_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest accepted percentage.
pub const MAX_PERCENTAGE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// GST percentage applied when a courier does not specify one.
pub const DEFAULT_GST_PCT: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// Which amount the fuel surcharge percentage is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelBasis {
    /// Fuel on freight only.
    #[default]
    Freight,
    /// Fuel on the floored pre-fuel subtotal.
    Subtotal,
}

impl FromStr for FuelBasis {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "freight" => Ok(FuelBasis::Freight),
            "subtotal" => Ok(FuelBasis::Subtotal),
            other => Err(format!(
                "unknown fuel_basis '{}' (expected 'freight' or 'subtotal')",
                other
            )),
        }
    }
}

impl fmt::Display for FuelBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelBasis::Freight => write!(f, "freight"),
            FuelBasis::Subtotal => write!(f, "subtotal"),
        }
    }
}

/// How the out-of-delivery-area surcharge is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OdaPolicy {
    /// A fixed fee per ODA shipment.
    #[default]
    Fixed,
    /// A distance/weight matrix lookup.
    Special,
}

impl FromStr for OdaPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "fixed" => Ok(OdaPolicy::Fixed),
            "special" => Ok(OdaPolicy::Special),
            other => Err(format!(
                "unknown oda_type '{}' (expected 'Fixed' or 'Special')",
                other
            )),
        }
    }
}

impl fmt::Display for OdaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OdaPolicy::Fixed => write!(f, "Fixed"),
            OdaPolicy::Special => write!(f, "Special"),
        }
    }
}

/// Normalizes a zone code for storage and lookup.
pub fn normalize_zone(zone: &str) -> String {
    zone.trim().to_uppercase()
}

/// A courier's zone → rate-per-kg table with upper-cased keys.
///
/// # Example
///
/// ```
/// use courier_quote_engine::config::RateTable;
/// use rust_decimal::Decimal;
///
/// let table = RateTable::from_serialized(r#"{"a": 25, " b ": "30.5"}"#).unwrap();
/// assert_eq!(table.get("A"), Some(Decimal::new(25, 0)));
/// assert_eq!(table.get("b"), Some(Decimal::new(305, 1)));
/// assert_eq!(table.get("C"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    /// Creates an empty rate table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a serialized (JSON object) rate table.
    ///
    /// Blank text is an empty table. Anything that is not an object of
    /// numeric rates between zero and [`MAX_CONFIG_AMOUNT`] is
    /// `MalformedRateData`.
    pub fn from_serialized(raw: &str) -> EngineResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let value: serde_json::Value =
            serde_json::from_str(trimmed).map_err(|e| EngineError::MalformedRateData {
                message: e.to_string(),
            })?;
        Self::from_json_value(&value)
    }

    /// Builds a rate table from an already-parsed JSON value.
    pub fn from_json_value(value: &serde_json::Value) -> EngineResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| EngineError::MalformedRateData {
                message: "rates must be a JSON object".to_string(),
            })?;

        let mut table = Self::new();
        for (zone, raw_rate) in object {
            let rate = parse_rate(raw_rate).ok_or_else(|| EngineError::MalformedRateData {
                message: format!("rate for zone '{}' is not a number: {}", zone, raw_rate),
            })?;
            if rate < Decimal::ZERO {
                return Err(EngineError::MalformedRateData {
                    message: format!("rate for zone '{}' is negative", zone),
                });
            }
            if rate > MAX_CONFIG_AMOUNT {
                return Err(EngineError::MalformedRateData {
                    message: format!("rate for zone '{}' exceeds {}", zone, MAX_CONFIG_AMOUNT),
                });
            }
            table.insert(zone, rate);
        }
        Ok(table)
    }

    /// Returns the rate for a zone, matching case-insensitively.
    pub fn get(&self, zone: &str) -> Option<Decimal> {
        self.rates.get(&normalize_zone(zone)).copied()
    }

    /// Inserts or replaces the rate for a zone.
    pub fn insert(&mut self, zone: &str, rate: Decimal) {
        self.rates.insert(normalize_zone(zone), rate);
    }

    /// Removes and returns the rate for a zone.
    pub fn remove(&mut self, zone: &str) -> Option<Decimal> {
        self.rates.remove(&normalize_zone(zone))
    }

    /// Returns true when no zone has a rate.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Returns the number of zones with a rate.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Iterates `(zone, rate)` pairs in zone order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(zone, rate)| (zone.as_str(), *rate))
    }
}

impl<'a> FromIterator<(&'a str, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, Decimal)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (zone, rate) in iter {
            table.insert(zone, rate);
        }
        table
    }
}

fn parse_rate(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

/// Per-courier pricing policy.
///
/// Instances are only built through [`CourierConfigInput::into_config`], so
/// the enums are always recognized values and every fee is non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourierConfig {
    /// Unique courier name.
    pub name: String,
    /// Zone → rate-per-kg table.
    pub rates: RateTable,
    /// Generic per-kg rate used when the zone has no rate.
    pub rate_per_kg: Option<Decimal>,
    /// Flat docket fee per shipment.
    pub docket: Decimal,
    /// Fuel surcharge percentage.
    pub fuel_pct: Decimal,
    /// What the fuel percentage applies to.
    pub fuel_basis: FuelBasis,
    /// Insurance as a percentage of declared value.
    pub insurance_pct: Decimal,
    /// Minimum (flat) insurance fee.
    pub insurance_flat: Decimal,
    /// ODA pricing policy.
    pub oda_type: OdaPolicy,
    /// ODA fee for the fixed policy.
    pub oda_fixed: Decimal,
    /// GST percentage.
    pub gst_pct: Decimal,
    /// Minimum pre-fuel subtotal.
    pub min_charge: Decimal,
    /// Reference table path, relative to the configuration directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<String>,
}

/// Where a courier's rates come from in an input document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RateSource {
    /// Rates stored as serialized JSON text.
    Serialized(String),
    /// Rates given inline as a mapping.
    Inline(serde_json::Value),
}

impl RateSource {
    /// Parses the rates, reporting malformed data as an error.
    pub fn parse(&self) -> EngineResult<RateTable> {
        match self {
            RateSource::Serialized(raw) => RateTable::from_serialized(raw),
            RateSource::Inline(value) => RateTable::from_json_value(value),
        }
    }
}

/// Unvalidated courier configuration as read from YAML or JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct CourierConfigInput {
    /// Unique courier name.
    pub name: String,
    /// Zone rates.
    #[serde(default)]
    pub rates: Option<RateSource>,
    /// Generic per-kg fallback rate.
    #[serde(default)]
    pub rate_per_kg: Option<Decimal>,
    /// Docket fee.
    #[serde(default)]
    pub docket: Option<Decimal>,
    /// Fuel percentage.
    #[serde(default)]
    pub fuel_pct: Option<Decimal>,
    /// Fuel basis (`freight` or `subtotal`).
    #[serde(default)]
    pub fuel_basis: Option<String>,
    /// Insurance percentage.
    #[serde(default)]
    pub insurance_pct: Option<Decimal>,
    /// Flat insurance fee.
    #[serde(default)]
    pub insurance_flat: Option<Decimal>,
    /// ODA policy (`Fixed` or `Special`).
    #[serde(default)]
    pub oda_type: Option<String>,
    /// Fixed ODA fee.
    #[serde(default)]
    pub oda_fixed: Option<Decimal>,
    /// GST percentage.
    #[serde(default)]
    pub gst_pct: Option<Decimal>,
    /// Minimum charge.
    #[serde(default)]
    pub min_charge: Option<Decimal>,
    /// Reference table path.
    #[serde(default)]
    pub reference_table: Option<String>,
}

impl CourierConfigInput {
    /// Validates the input into a [`CourierConfig`].
    ///
    /// Unknown `fuel_basis` or `oda_type` values and negative amounts fail
    /// with `InvalidConfiguration`. Malformed rates do not fail: they are
    /// logged and replaced by an empty table, so every zone later reports a
    /// missing rate.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_quote_engine::config::{CourierConfigInput, FuelBasis, OdaPolicy};
    ///
    /// let input: CourierConfigInput = serde_yaml::from_str(r#"
    /// name: Bluedart
    /// rates: '{"A": 25, "B": 30}'
    /// fuel_basis: Subtotal
    /// oda_type: special
    /// "#).unwrap();
    ///
    /// let config = input.into_config().unwrap();
    /// assert_eq!(config.fuel_basis, FuelBasis::Subtotal);
    /// assert_eq!(config.oda_type, OdaPolicy::Special);
    /// assert_eq!(config.rates.len(), 2);
    /// ```
    pub fn into_config(self) -> EngineResult<CourierConfig> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                subject: "<unnamed>".to_string(),
                message: "courier name must not be empty".to_string(),
            });
        }

        let fuel_basis = parse_enum::<FuelBasis>(&name, self.fuel_basis.as_deref())?;
        let oda_type = parse_enum::<OdaPolicy>(&name, self.oda_type.as_deref())?;

        let mut rates = match &self.rates {
            Some(source) => source.parse().unwrap_or_else(|err| {
                warn!(courier = %name, error = %err, "Malformed rate data, using empty rate table");
                RateTable::new()
            }),
            None => RateTable::new(),
        };
        let rate_per_kg = match self.rate_per_kg {
            Some(rate) => {
                rates.remove(GENERIC_RATE_KEY);
                Some(rate)
            }
            None => rates.remove(GENERIC_RATE_KEY),
        };

        let config = CourierConfig {
            rates,
            rate_per_kg: bounded(&name, "rate_per_kg", rate_per_kg, MAX_CONFIG_AMOUNT)?,
            docket: amount(&name, "docket", self.docket)?,
            fuel_pct: percentage(&name, "fuel_pct", self.fuel_pct)?,
            fuel_basis,
            insurance_pct: percentage(&name, "insurance_pct", self.insurance_pct)?,
            insurance_flat: amount(&name, "insurance_flat", self.insurance_flat)?,
            oda_type,
            oda_fixed: amount(&name, "oda_fixed", self.oda_fixed)?,
            gst_pct: percentage(&name, "gst_pct", Some(self.gst_pct.unwrap_or(DEFAULT_GST_PCT)))?,
            min_charge: amount(&name, "min_charge", self.min_charge)?,
            reference_table: self
                .reference_table
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            name,
        };
        Ok(config)
    }
}

fn parse_enum<T>(courier: &str, raw: Option<&str>) -> EngineResult<T>
where
    T: FromStr<Err = String> + Default,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(T::default()),
        Some(value) => value
            .parse()
            .map_err(|message| EngineError::InvalidConfiguration {
                subject: courier.to_string(),
                message,
            }),
    }
}

fn bounded(
    courier: &str,
    field: &str,
    value: Option<Decimal>,
    max: Decimal,
) -> EngineResult<Option<Decimal>> {
    let problem = match value {
        Some(v) if v < Decimal::ZERO => format!("{} must not be negative (got {})", field, v),
        Some(v) if v > max => format!("{} must not exceed {} (got {})", field, max, v),
        other => return Ok(other),
    };
    Err(EngineError::InvalidConfiguration {
        subject: courier.to_string(),
        message: problem,
    })
}

fn amount(courier: &str, field: &str, value: Option<Decimal>) -> EngineResult<Decimal> {
    Ok(bounded(courier, field, value, MAX_CONFIG_AMOUNT)?.unwrap_or(Decimal::ZERO))
}

fn percentage(courier: &str, field: &str, value: Option<Decimal>) -> EngineResult<Decimal> {
    Ok(bounded(courier, field, value, MAX_PERCENTAGE)?.unwrap_or(Decimal::ZERO))
}
