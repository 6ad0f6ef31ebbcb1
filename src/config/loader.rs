//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading courier
//! configurations and their pincode reference tables from YAML files.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::calculation::{DistanceBand, OdaChargeMatrix};
use crate::error::{EngineError, EngineResult};
use crate::reference::{PincodeTable, ReferenceRow};

use super::catalog::CourierCatalog;
use super::types::{CourierConfig, CourierConfigInput};

/// File name of the optional ODA matrix override.
pub const ODA_MATRIX_FILE: &str = "oda_matrix.yaml";

#[derive(Debug, Deserialize)]
struct OdaMatrixFile {
    bands: Vec<DistanceBand>,
}

/// Loads the courier catalog from a configuration directory.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── couriers/           # One YAML file per courier
/// │   ├── bluedart.yaml
/// │   └── xp_india.yaml
/// ├── references/         # Pincode tables named by `reference_table`
/// │   └── bluedart.yaml
/// └── oda_matrix.yaml     # Optional; the standard matrix is used otherwise
/// ```
///
/// # Example
///
/// ```no_run
/// use courier_quote_engine::config::{ConfigLoader, CourierStore};
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// for courier in loader.catalog().list() {
///     println!("{}: {} zones", courier.name, courier.rates.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    catalog: CourierCatalog,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Courier files are read in file-name order, which becomes the courier
    /// order of the catalog.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` when the couriers directory, a courier file or a
    ///   referenced table is missing, or no courier files exist
    /// - `ConfigParseError` when a file is not valid YAML of the expected shape
    /// - `InvalidConfiguration` when a courier or the ODA matrix fails
    ///   validation, or two couriers share a name
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let root = path.as_ref().to_path_buf();

        let couriers_dir = root.join("couriers");
        let courier_files = Self::courier_files(&couriers_dir)?;

        let mut couriers = Vec::with_capacity(courier_files.len());
        let mut references = HashMap::new();

        for file in &courier_files {
            let input = Self::load_yaml::<CourierConfigInput>(file)?;
            let config = input.into_config()?;

            match &config.reference_table {
                Some(relative) => {
                    let table = Self::load_reference_table(&root.join(relative))?;
                    debug!(
                        courier = %config.name,
                        pincodes = table.len(),
                        "Loaded reference table"
                    );
                    references.insert(config.name.clone(), Arc::new(table));
                }
                None => {
                    warn!(courier = %config.name, "Courier has no reference table; every pincode will be rejected");
                }
            }
            couriers.push(config);
        }

        let oda_matrix = Self::load_oda_matrix(&root.join(ODA_MATRIX_FILE))?;
        let catalog = CourierCatalog::new(couriers, references, oda_matrix)?;

        info!(
            path = %root.display(),
            couriers = catalog.couriers().len(),
            "Courier configuration loaded"
        );
        Ok(Self { root, catalog })
    }

    /// Loads and normalizes a pincode reference table file.
    pub fn load_reference_table(path: &Path) -> EngineResult<PincodeTable> {
        let rows = Self::load_yaml::<Vec<ReferenceRow>>(path)?;
        Ok(PincodeTable::from_rows(rows))
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Lists the courier YAML files in file-name order.
    fn courier_files(couriers_dir: &Path) -> EngineResult<Vec<PathBuf>> {
        let dir_str = couriers_dir.display().to_string();

        let entries = fs::read_dir(couriers_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no courier files found)", dir_str),
            });
        }

        files.sort();
        Ok(files)
    }

    fn load_oda_matrix(path: &Path) -> EngineResult<OdaChargeMatrix> {
        if !path.exists() {
            return Ok(OdaChargeMatrix::standard());
        }
        let file = Self::load_yaml::<OdaMatrixFile>(path)?;
        let matrix = OdaChargeMatrix::new(file.bands)?;
        info!(path = %path.display(), bands = matrix.bands().len(), "Loaded ODA matrix override");
        Ok(matrix)
    }

    /// Returns the configuration directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the loaded catalog.
    pub fn catalog(&self) -> &CourierCatalog {
        &self.catalog
    }

    /// Returns the loaded couriers in catalog order.
    pub fn couriers(&self) -> &[CourierConfig] {
        self.catalog.couriers()
    }

    /// Consumes the loader, returning the catalog.
    pub fn into_catalog(self) -> CourierCatalog {
        self.catalog
    }
}
