//! Error types for the Courier Quote Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Data-shaped outcomes such as an unknown pincode or a zone without a rate
//! are not errors; they are carried in the `reason` of a quote. Errors are
//! reserved for broken configuration and caller contract violations.

use thiserror::Error;

/// The main error type for the Courier Quote Engine.
///
/// # Example
///
/// ```
/// use courier_quote_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/couriers".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/couriers");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file or directory was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No courier with the given name is configured.
    #[error("Courier not found: {name}")]
    CourierNotFound {
        /// The courier name that was not found.
        name: String,
    },

    /// A courier configuration (or the ODA matrix) failed validation.
    #[error("Invalid configuration for '{subject}': {message}")]
    InvalidConfiguration {
        /// The courier name, or `oda_matrix`.
        subject: String,
        /// A description of what made the configuration invalid.
        message: String,
    },

    /// A serialized rate table could not be parsed.
    ///
    /// Stores degrade this to an empty rate table instead of propagating it.
    #[error("Malformed rate data: {message}")]
    MalformedRateData {
        /// A description of the parse failure.
        message: String,
    },

    /// A shipment violated the input contract (e.g. negative weight).
    #[error("Invalid shipment field '{field}': {message}")]
    InvalidShipment {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
