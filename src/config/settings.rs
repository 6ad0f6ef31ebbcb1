//! Process settings read from the environment.

use std::env;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

/// Default configuration directory.
pub const DEFAULT_CONFIG_DIR: &str = "./config";

/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 5050;

/// Settings for the quote server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding `couriers/`, `references/` and the ODA matrix.
    pub config_dir: PathBuf,
    /// Port the HTTP API listens on.
    pub http_port: u16,
    /// `tracing` filter directive.
    pub log_level: String,
}

impl Settings {
    /// Reads `QUOTE_CONFIG_DIR`, `HTTP_PORT` and `LOG_LEVEL`, loading a
    /// `.env` file first when one exists.
    pub fn from_env() -> EngineResult<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            config_dir: env::var("QUOTE_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR)),
            http_port: parse_or_default("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            http_port: DEFAULT_HTTP_PORT,
            log_level: "info".to_string(),
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> EngineResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| EngineError::InvalidConfiguration {
                subject: key.to_string(),
                message: format!("invalid value '{raw}': {err}"),
            }),
        Err(_) => Ok(default),
    }
}
