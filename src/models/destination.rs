//! Destination record model and delivery status normalization.
//!
//! A [`DestinationRecord`] is what a courier's reference table says about a
//! pincode: which rate zone it falls in, whether it is serviceable or out of
//! the delivery area, and how far out it is.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Delivery status of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Regular serviceable destination.
    #[default]
    #[serde(rename = "OK")]
    Serviceable,
    /// Out of delivery area; attracts an ODA surcharge.
    #[serde(rename = "ODA")]
    OutOfDeliveryArea,
}

impl DeliveryStatus {
    /// Normalizes a raw status cell from a reference table.
    ///
    /// `YES` and `Y` (a yes/no "ODA" column) mean out of delivery area, as
    /// does any value containing `ODA` or `EDL`. Everything else, including
    /// blanks, is serviceable.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_quote_engine::models::DeliveryStatus;
    ///
    /// assert_eq!(DeliveryStatus::normalize(" yes "), DeliveryStatus::OutOfDeliveryArea);
    /// assert_eq!(DeliveryStatus::normalize("EDL-2"), DeliveryStatus::OutOfDeliveryArea);
    /// assert_eq!(DeliveryStatus::normalize("ok"), DeliveryStatus::Serviceable);
    /// assert_eq!(DeliveryStatus::normalize(""), DeliveryStatus::Serviceable);
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        if upper == "YES" || upper == "Y" || upper.contains("ODA") || upper.contains("EDL") {
            DeliveryStatus::OutOfDeliveryArea
        } else {
            DeliveryStatus::Serviceable
        }
    }

    /// Returns true for out-of-delivery-area destinations.
    pub fn is_oda(&self) -> bool {
        *self == DeliveryStatus::OutOfDeliveryArea
    }

    /// Returns the display code (`OK` or `ODA`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Serviceable => "OK",
            DeliveryStatus::OutOfDeliveryArea => "ODA",
        }
    }
}

/// A resolved reference-table row for one pincode and one courier.
///
/// Records are produced fresh by a lookup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRecord {
    /// The normalized pincode.
    pub pincode: String,
    /// The upper-cased rate zone code (may be empty).
    pub zone: String,
    /// The delivery status.
    pub status: DeliveryStatus,
    /// The state the pincode belongs to.
    #[serde(default)]
    pub state: String,
    /// The city, district or area.
    #[serde(default)]
    pub location: String,
    /// Distance beyond the serviceable network in kilometers (0 when unknown).
    #[serde(default)]
    pub oda_distance: Decimal,
}
