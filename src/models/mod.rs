//! Core data models for the Courier Quote Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod destination;
mod quote_result;
mod shipment;

pub use destination::{DeliveryStatus, DestinationRecord};
pub use quote_result::{AuditStep, CostBreakdown, QuoteResult, REASON_OK, Rejection};
pub use shipment::{MAX_SHIPMENT_AMOUNT, ShipmentRequest};
