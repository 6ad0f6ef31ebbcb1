//! Courier Quote Engine
//!
//! This crate prices a shipment against every configured courier's rate
//! card: zone rates, insurance, out-of-delivery-area surcharges, fuel and
//! GST, with an audit trace of every pricing step. It also ships the HTTP
//! API that recommends the cheapest courier per destination pincode.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod reference;
