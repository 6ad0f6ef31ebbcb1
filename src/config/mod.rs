//! Configuration loading and management for the Courier Quote Engine.
//!
//! This module provides functionality to load courier configurations from
//! YAML files, including rate tables, surcharge policies and pincode
//! reference tables, into an immutable [`CourierCatalog`].
//!
//! # Example
//!
//! ```no_run
//! use courier_quote_engine::config::{ConfigLoader, CourierStore};
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! let courier = loader.catalog().get("Bluedart").unwrap();
//! println!("Loaded courier: {} ({} ODA)", courier.name, courier.oda_type);
//! ```

mod catalog;
mod loader;
mod settings;
mod types;

pub use catalog::{CourierCatalog, CourierStore};
pub use loader::{ConfigLoader, ODA_MATRIX_FILE};
pub use settings::{DEFAULT_CONFIG_DIR, DEFAULT_HTTP_PORT, Settings};
pub use types::{
    CourierConfig, CourierConfigInput, DEFAULT_GST_PCT, FuelBasis, GENERIC_RATE_KEY, MAX_CONFIG_AMOUNT,
    MAX_PERCENTAGE, OdaPolicy, RateSource, RateTable, normalize_zone,
};
