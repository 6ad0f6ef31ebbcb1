//! Immutable courier catalog snapshots.
//!
//! A [`CourierCatalog`] bundles every configured courier with its pincode
//! reference table and the ODA charge matrix. Snapshots are never mutated;
//! upserts and removals produce a new snapshot that callers swap in.

use std::collections::HashMap;
use std::sync::Arc;

use crate::calculation::OdaChargeMatrix;
use crate::error::{EngineError, EngineResult};
use crate::models::DestinationRecord;
use crate::reference::{PincodeTable, ReferenceResolver};

use super::types::CourierConfig;

/// Read access to configured couriers.
pub trait CourierStore {
    /// Returns every courier in configuration order.
    fn list(&self) -> &[CourierConfig];

    /// Returns a courier by name, matching case-insensitively.
    fn get(&self, name: &str) -> EngineResult<&CourierConfig>;
}

/// Couriers, their reference tables and the ODA matrix.
///
/// # Example
///
/// ```
/// use courier_quote_engine::calculation::OdaChargeMatrix;
/// use courier_quote_engine::config::{CourierCatalog, CourierConfigInput, CourierStore};
///
/// let xp = serde_yaml::from_str::<CourierConfigInput>("name: XP India")
///     .unwrap()
///     .into_config()
///     .unwrap();
/// let catalog = CourierCatalog::new(vec![xp], Default::default(), OdaChargeMatrix::standard()).unwrap();
///
/// assert!(catalog.get("xp india").is_ok());
/// assert!(catalog.get("Bluedart").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CourierCatalog {
    couriers: Vec<CourierConfig>,
    references: HashMap<String, Arc<PincodeTable>>,
    oda_matrix: OdaChargeMatrix,
}

impl CourierCatalog {
    /// Creates a catalog.
    ///
    /// `references` is keyed by courier name. Two couriers whose names differ
    /// only in case are rejected as duplicates.
    pub fn new(
        couriers: Vec<CourierConfig>,
        references: HashMap<String, Arc<PincodeTable>>,
        oda_matrix: OdaChargeMatrix,
    ) -> EngineResult<Self> {
        for (index, courier) in couriers.iter().enumerate() {
            if couriers[..index]
                .iter()
                .any(|other| same_name(&other.name, &courier.name))
            {
                return Err(EngineError::InvalidConfiguration {
                    subject: courier.name.clone(),
                    message: "duplicate courier name".to_string(),
                });
            }
        }

        let references = references
            .into_iter()
            .map(|(name, table)| (name_key(&name), table))
            .collect();

        Ok(Self {
            couriers,
            references,
            oda_matrix,
        })
    }

    /// Returns the couriers in configuration order.
    pub fn couriers(&self) -> &[CourierConfig] {
        &self.couriers
    }

    /// Returns the ODA charge matrix.
    pub fn oda_matrix(&self) -> &OdaChargeMatrix {
        &self.oda_matrix
    }

    /// Returns a courier's reference table, if it has one.
    pub fn reference_table(&self, courier: &str) -> Option<&Arc<PincodeTable>> {
        self.references.get(&name_key(courier))
    }

    /// Returns a new snapshot with the courier inserted or replaced.
    ///
    /// A replaced courier keeps its position. When `table` is `None` an
    /// existing reference table for the courier is kept.
    pub fn with_courier(&self, config: CourierConfig, table: Option<Arc<PincodeTable>>) -> Self {
        let mut next = self.clone();
        let key = name_key(&config.name);

        match next
            .couriers
            .iter_mut()
            .find(|existing| same_name(&existing.name, &config.name))
        {
            Some(existing) => *existing = config,
            None => next.couriers.push(config),
        }
        if let Some(table) = table {
            next.references.insert(key, table);
        }
        next
    }

    /// Returns a new snapshot without the named courier.
    pub fn without_courier(&self, name: &str) -> EngineResult<Self> {
        let position = self
            .couriers
            .iter()
            .position(|courier| same_name(&courier.name, name))
            .ok_or_else(|| EngineError::CourierNotFound {
                name: name.to_string(),
            })?;

        let mut next = self.clone();
        next.couriers.remove(position);
        next.references.remove(&name_key(name));
        Ok(next)
    }
}

impl CourierStore for CourierCatalog {
    fn list(&self) -> &[CourierConfig] {
        &self.couriers
    }

    fn get(&self, name: &str) -> EngineResult<&CourierConfig> {
        self.couriers
            .iter()
            .find(|courier| same_name(&courier.name, name))
            .ok_or_else(|| EngineError::CourierNotFound {
                name: name.to_string(),
            })
    }
}

impl ReferenceResolver for CourierCatalog {
    fn lookup(&self, courier: &str, pincode: &str) -> Option<DestinationRecord> {
        self.reference_table(courier)
            .and_then(|table| table.lookup(pincode))
            .cloned()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn same_name(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CourierConfigInput;
    use crate::reference::ReferenceRow;

    fn config(yaml: &str) -> CourierConfig {
        serde_yaml::from_str::<CourierConfigInput>(yaml)
            .unwrap()
            .into_config()
            .unwrap()
    }

    fn table(pincode: &str, zone: &str) -> Arc<PincodeTable> {
        let row: ReferenceRow =
            serde_json::from_value(serde_json::json!({ "pincode": pincode, "zone": zone })).unwrap();
        Arc::new(PincodeTable::from_rows(vec![row]))
    }

    fn catalog() -> CourierCatalog {
        let mut references = HashMap::new();
        references.insert("Bluedart".to_string(), table("110001", "A"));
        CourierCatalog::new(
            vec![config("name: Bluedart"), config("name: XP India")],
            references,
            OdaChargeMatrix::standard(),
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = CourierCatalog::new(
            vec![config("name: Bluedart"), config("name: BLUEDART")],
            HashMap::new(),
            OdaChargeMatrix::standard(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_get_unknown_courier_returns_error() {
        match catalog().get("Delhivery") {
            Err(EngineError::CourierNotFound { name }) => assert_eq!(name, "Delhivery"),
            other => panic!("Expected CourierNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_resolves_through_courier_table() {
        let catalog = catalog();
        let record = catalog.lookup("bluedart", "110001").unwrap();
        assert_eq!(record.zone, "A");
        assert!(catalog.lookup("Bluedart", "999999").is_none());
        assert!(catalog.lookup("XP India", "110001").is_none());
    }

    #[test]
    fn test_with_courier_replaces_in_place_and_keeps_table() {
        let base = catalog();
        let next = base.with_courier(config("name: Bluedart\ndocket: 75"), None);

        assert_eq!(next.list().len(), 2);
        assert_eq!(next.list()[0].name, "Bluedart");
        assert_eq!(next.list()[0].docket, rust_decimal::Decimal::new(75, 0));
        assert!(next.lookup("Bluedart", "110001").is_some());
        assert_eq!(base.list()[0].docket, rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_with_courier_appends_new_courier() {
        let next = catalog().with_courier(config("name: Delhivery"), Some(table("400001", "B")));
        assert_eq!(next.list().len(), 3);
        assert_eq!(next.list()[2].name, "Delhivery");
        assert_eq!(next.lookup("Delhivery", "400001").unwrap().zone, "B");
    }

    #[test]
    fn test_without_courier_drops_config_and_table() {
        let base = catalog();
        let next = base.without_courier("BLUEDART").unwrap();
        assert_eq!(next.list().len(), 1);
        assert!(next.reference_table("Bluedart").is_none());
        assert!(base.without_courier("Delhivery").is_err());
    }
}
