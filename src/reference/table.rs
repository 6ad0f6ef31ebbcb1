//! In-memory pincode reference table.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::debug;

use crate::config::normalize_zone;
use crate::models::{DeliveryStatus, DestinationRecord};

/// A raw reference-table row: column header → scalar cell.
pub type ReferenceRow = BTreeMap<String, Value>;

/// Canonical columns and the header aliases accepted for each, in priority
/// order. The canonical name always comes first.
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("pincode", &["pincode", "pin", "pin code", "postal", "zip"]),
    ("zone", &["zone", "zone name", "zonename", "region"]),
    ("state", &["state", "statename"]),
    ("location", &["location", "loc", "city", "district", "area"]),
    ("status", &["status", "service status", "oda"]),
    (
        "oda_distance",
        &[
            "oda_distance",
            "distance",
            "dist",
            "distance_km",
            "oda_km",
            "oda distance",
            "km",
            "dist (km)",
        ],
    ),
];

/// Destination records for one courier, keyed by normalized pincode.
///
/// # Example
///
/// ```
/// use courier_quote_engine::reference::{PincodeTable, ReferenceRow};
/// use courier_quote_engine::models::DeliveryStatus;
///
/// let row: ReferenceRow = serde_json::from_str(
///     r#"{"Pin Code": 788001, "Zone Name": "c", "ODA": "YES", "Distance": "75"}"#,
/// ).unwrap();
/// let table = PincodeTable::from_rows(vec![row]);
///
/// let record = table.lookup("788001").unwrap();
/// assert_eq!(record.zone, "C");
/// assert_eq!(record.status, DeliveryStatus::OutOfDeliveryArea);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PincodeTable {
    records: HashMap<String, DestinationRecord>,
}

impl PincodeTable {
    /// Builds a table from raw rows, normalizing headers and cells.
    ///
    /// Rows without a pincode are skipped. When a pincode repeats, the first
    /// row wins.
    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        let mut records = HashMap::with_capacity(rows.len());
        let mut skipped = 0usize;

        for row in rows {
            match normalize_row(&row) {
                Some(record) => {
                    records.entry(record.pincode.clone()).or_insert(record);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "Skipped reference rows without a pincode");
        }
        Self { records }
    }

    /// Builds a table from already-normalized records. The first record for
    /// a pincode wins.
    pub fn from_records<I: IntoIterator<Item = DestinationRecord>>(records: I) -> Self {
        let mut map = HashMap::new();
        for mut record in records {
            record.pincode = normalize_pincode_text(&record.pincode);
            record.zone = normalize_zone(&record.zone);
            if record.pincode.is_empty() {
                continue;
            }
            map.entry(record.pincode.clone()).or_insert(record);
        }
        Self { records: map }
    }

    /// Returns the record for a pincode, if any.
    pub fn lookup(&self, pincode: &str) -> Option<&DestinationRecord> {
        self.records.get(&normalize_pincode_text(pincode))
    }

    /// Returns the number of distinct pincodes.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalizes a pincode given as text: trimmed, with a trailing `.0`
/// removed.
pub fn normalize_pincode_text(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).to_string()
}

fn normalize_row(row: &ReferenceRow) -> Option<DestinationRecord> {
    let headers: Vec<(String, &Value)> = row
        .iter()
        .map(|(header, value)| (header.trim().to_lowercase(), value))
        .collect();

    let column = |canonical: &str| column_value(&headers, canonical);

    let pincode = column("pincode").map(pincode_cell).unwrap_or_default();
    if pincode.is_empty() {
        return None;
    }

    Some(DestinationRecord {
        pincode,
        zone: normalize_zone(&column("zone").map(text_cell).unwrap_or_default()),
        status: DeliveryStatus::normalize(&column("status").map(status_cell).unwrap_or_default()),
        state: column("state").map(text_cell).unwrap_or_default(),
        location: column("location").map(text_cell).unwrap_or_default(),
        oda_distance: column("oda_distance").map(distance_cell).unwrap_or_default(),
    })
}

fn column_value<'a>(headers: &[(String, &'a Value)], canonical: &str) -> Option<&'a Value> {
    let (_, aliases) = COLUMN_ALIASES.iter().find(|(name, _)| *name == canonical)?;
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .find(|(header, value)| header.as_str() == *alias && !value.is_null())
            .map(|(_, value)| *value)
    })
}

fn pincode_cell(value: &Value) -> String {
    match value {
        Value::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => u.to_string(),
            (None, Some(i), _) => i.to_string(),
            (None, None, Some(f)) if f.fract() == 0.0 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        other => normalize_pincode_text(&text_cell(other)),
    }
}

fn text_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn status_cell(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Y".to_string(),
        Value::Bool(false) => String::new(),
        other => text_cell(other),
    }
}

fn distance_cell(value: &Value) -> Decimal {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Decimal::ZERO,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: &str) -> ReferenceRow {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_canonical_columns() {
        let table = PincodeTable::from_rows(vec![row(
            r#"{"pincode": "110001", "zone": "a", "status": "OK", "state": "Delhi", "location": "New Delhi", "oda_distance": 0}"#,
        )]);
        let record = table.lookup("110001").unwrap();

        assert_eq!(record.zone, "A");
        assert_eq!(record.status, DeliveryStatus::Serviceable);
        assert_eq!(record.state, "Delhi");
        assert_eq!(record.location, "New Delhi");
        assert_eq!(record.oda_distance, Decimal::ZERO);
    }

    #[test]
    fn test_aliases_are_mapped_after_trimming_and_lowercasing() {
        let table = PincodeTable::from_rows(vec![row(
            r#"{" PIN ": 795001, "Region": "d", "StateName": "Manipur", "City": "Imphal", "Service Status": "EDL", "Dist (km)": "120.5"}"#,
        )]);
        let record = table.lookup("795001").unwrap();

        assert_eq!(record.zone, "D");
        assert_eq!(record.state, "Manipur");
        assert_eq!(record.location, "Imphal");
        assert_eq!(record.status, DeliveryStatus::OutOfDeliveryArea);
        assert_eq!(record.oda_distance, Decimal::new(1205, 1));
    }

    #[test]
    fn test_alias_does_not_override_canonical_column() {
        let table = PincodeTable::from_rows(vec![row(
            r#"{"pincode": "400001", "zone": "B", "region": "West", "city": "Mumbai"}"#,
        )]);
        assert_eq!(table.lookup("400001").unwrap().zone, "B");
    }

    #[test]
    fn test_float_pincode_loses_trailing_zero() {
        let table = PincodeTable::from_rows(vec![
            row(r#"{"pincode": 110001.0, "zone": "A"}"#),
            row(r#"{"pincode": "400001.0", "zone": "B"}"#),
        ]);
        assert!(table.lookup("110001").is_some());
        assert!(table.lookup("400001").is_some());
        assert!(table.lookup(" 400001.0 ").is_some());
    }

    #[test]
    fn test_non_numeric_distance_is_zero() {
        let table = PincodeTable::from_rows(vec![row(
            r#"{"pincode": "788001", "zone": "C", "status": "ODA", "distance": "far"}"#,
        )]);
        assert_eq!(table.lookup("788001").unwrap().oda_distance, Decimal::ZERO);
    }

    #[test]
    fn test_first_row_wins_and_rows_without_pincode_are_skipped() {
        let table = PincodeTable::from_rows(vec![
            row(r#"{"pincode": "110001", "zone": "A"}"#),
            row(r#"{"pincode": "110001", "zone": "Z"}"#),
            row(r#"{"zone": "B"}"#),
            row(r#"{"pincode": "  ", "zone": "B"}"#),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("110001").unwrap().zone, "A");
    }

    #[test]
    fn test_missing_status_is_serviceable() {
        let table = PincodeTable::from_rows(vec![row(r#"{"pincode": "110001"}"#)]);
        let record = table.lookup("110001").unwrap();
        assert_eq!(record.status, DeliveryStatus::Serviceable);
        assert_eq!(record.zone, "");
    }

    #[test]
    fn test_unknown_pincode_is_absent() {
        let table = PincodeTable::from_rows(vec![row(r#"{"pincode": "110001"}"#)]);
        assert!(table.lookup("999999").is_none());
    }
}
