//! Pincode reference data.
//!
//! Every courier publishes its own table mapping pincodes to a rate zone, a
//! delivery status and an ODA distance. The pricing core never reads those
//! tables directly; it receives a [`DestinationRecord`] (or nothing) from a
//! [`ReferenceResolver`].

mod table;

pub use table::{PincodeTable, ReferenceRow, normalize_pincode_text};

use crate::models::DestinationRecord;

/// Resolves a courier's destination record for a pincode.
///
/// Implementations must be pure lookups: the same `(courier, pincode)` pair
/// always resolves to the same record.
pub trait ReferenceResolver {
    /// Returns the courier's record for the pincode, or `None` when the
    /// courier has no table or the pincode is not in it.
    fn lookup(&self, courier: &str, pincode: &str) -> Option<DestinationRecord>;
}
