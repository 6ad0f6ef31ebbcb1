//! Quote result models for the Courier Quote Engine.
//!
//! This module contains the [`QuoteResult`] type and its associated structures
//! that capture the output of pricing one shipment with one courier: the
//! itemized [`CostBreakdown`], the echoed destination data, the reason code,
//! and an audit trace of every pricing step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DeliveryStatus, DestinationRecord};

/// Reason code carried by every successful quote.
pub const REASON_OK: &str = "OK";

/// Why a quote could not be produced for a (courier, pincode) pair.
///
/// Rejections are deterministic functions of the input data; repeating the
/// same request yields the same rejection.
///
/// # Example
///
/// ```
/// use courier_quote_engine::models::Rejection;
///
/// let rejection = Rejection::ZoneRateMissing { zone: "B".to_string() };
/// assert_eq!(rejection.reason(), "Rate missing for zone B");
/// assert_eq!(Rejection::PincodeNotFound.reason(), "Pincode not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The pincode is absent from the courier's reference table.
    PincodeNotFound,
    /// The courier has no rate for the destination zone and no fallback rate.
    ZoneRateMissing {
        /// The zone that had no rate.
        zone: String,
    },
}

impl Rejection {
    /// Returns the reason string surfaced to callers.
    pub fn reason(&self) -> String {
        match self {
            Rejection::PincodeNotFound => "Pincode not found".to_string(),
            Rejection::ZoneRateMissing { zone } => format!("Rate missing for zone {}", zone),
        }
    }
}

/// Itemized charges of a successful quote, rounded to two decimal places.
///
/// `total` is always exactly `subtotal + gst`, and `subtotal` never falls
/// below the courier's minimum charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Rate per kg times chargeable weight.
    pub freight: Decimal,
    /// Fuel surcharge.
    pub fuel: Decimal,
    /// Insurance charge.
    pub insurance: Decimal,
    /// Out-of-delivery-area surcharge.
    pub oda: Decimal,
    /// Flat docket fee.
    pub docket: Decimal,
    /// Pre-fuel subtotal after the minimum-charge floor.
    pub subtotal_pre_fuel: Decimal,
    /// Pre-tax subtotal including fuel.
    pub subtotal: Decimal,
    /// GST on the subtotal.
    pub gst: Decimal,
    /// Final amount payable.
    pub total: Decimal,
}

/// A single step in the audit trace recording a pricing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete result of quoting one shipment with one courier.
///
/// Rejected quotes carry no breakdown; the `reason` explains why.
///
/// # Example
///
/// ```
/// use courier_quote_engine::models::{QuoteResult, Rejection};
/// use rust_decimal::Decimal;
///
/// let result = QuoteResult::rejected(
///     "XP India",
///     "560001",
///     Decimal::new(5, 0),
///     None,
///     Rejection::PincodeNotFound,
///     vec![],
/// );
/// assert!(!result.is_ok());
/// assert_eq!(result.reason, "Pincode not found");
/// assert!(result.breakdown.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    /// The courier that was quoted.
    pub courier: String,
    /// The destination pincode as requested.
    pub pincode: String,
    /// The chargeable (effective) weight in kilograms.
    pub weight: Decimal,
    /// The destination zone, empty when the pincode was not found.
    pub zone: String,
    /// The delivery status, absent when the pincode was not found.
    pub status: Option<DeliveryStatus>,
    /// The destination state.
    pub state: String,
    /// The destination city, district or area.
    pub location: String,
    /// The ODA distance in kilometers.
    pub oda_distance: Decimal,
    /// The per-kg rate used for freight, when one resolved.
    pub zone_rate: Option<Decimal>,
    /// The itemized charges, present only for successful quotes.
    pub breakdown: Option<CostBreakdown>,
    /// `OK` or a rejection reason.
    pub reason: String,
    /// The pricing steps that produced this result.
    pub audit_trace: Vec<AuditStep>,
}

impl QuoteResult {
    /// Builds a rejected result, echoing whatever destination data is known.
    pub fn rejected(
        courier: &str,
        pincode: &str,
        weight: Decimal,
        record: Option<&DestinationRecord>,
        rejection: Rejection,
        audit_trace: Vec<AuditStep>,
    ) -> Self {
        let mut result = Self::echo(courier, pincode, weight, record);
        result.reason = rejection.reason();
        result.audit_trace = audit_trace;
        result
    }

    /// Builds a successful result.
    pub fn quoted(
        courier: &str,
        pincode: &str,
        weight: Decimal,
        record: &DestinationRecord,
        zone_rate: Decimal,
        breakdown: CostBreakdown,
        audit_trace: Vec<AuditStep>,
    ) -> Self {
        let mut result = Self::echo(courier, pincode, weight, Some(record));
        result.zone_rate = Some(zone_rate);
        result.breakdown = Some(breakdown);
        result.reason = REASON_OK.to_string();
        result.audit_trace = audit_trace;
        result
    }

    fn echo(
        courier: &str,
        pincode: &str,
        weight: Decimal,
        record: Option<&DestinationRecord>,
    ) -> Self {
        Self {
            courier: courier.to_string(),
            pincode: pincode.to_string(),
            weight,
            zone: record.map(|r| r.zone.clone()).unwrap_or_default(),
            status: record.map(|r| r.status),
            state: record.map(|r| r.state.clone()).unwrap_or_default(),
            location: record.map(|r| r.location.clone()).unwrap_or_default(),
            oda_distance: record.map(|r| r.oda_distance).unwrap_or_default(),
            zone_rate: None,
            breakdown: None,
            reason: String::new(),
            audit_trace: Vec::new(),
        }
    }

    /// Returns true when the quote was priced successfully.
    pub fn is_ok(&self) -> bool {
        self.reason == REASON_OK && self.breakdown.is_some()
    }

    /// Returns the total payable for successful quotes.
    pub fn total(&self) -> Option<Decimal> {
        self.breakdown.as_ref().map(|b| b.total)
    }
}
