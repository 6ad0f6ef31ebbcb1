//! Recent-quote log.
//!
//! A bounded, in-memory record of successful quotes for the "recent
//! searches" view. Only priced quotes are recorded; rejections are not.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::models::QuoteResult;

/// Number of entries the log keeps by default.
pub const RECENT_QUOTE_LIMIT: usize = 20;

/// One recorded quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentQuote {
    /// When the quote was recorded.
    pub checked_at: DateTime<Utc>,
    /// The destination pincode.
    pub pincode: String,
    /// The courier that was quoted.
    pub courier: String,
    /// The chargeable weight.
    pub weight: Decimal,
    /// The quoted total.
    pub total: Decimal,
}

/// Append-only log of recent successful quotes, oldest entries evicted first.
///
/// # Example
///
/// ```
/// use courier_quote_engine::history::QuoteLog;
///
/// let log = QuoteLog::new(2);
/// assert!(log.is_empty());
/// assert!(log.recent().is_empty());
/// ```
#[derive(Debug)]
pub struct QuoteLog {
    capacity: usize,
    entries: Mutex<VecDeque<RecentQuote>>,
}

impl QuoteLog {
    /// Creates a log keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Records a quote if it was priced successfully.
    ///
    /// Returns true when the quote was recorded.
    pub fn record(&self, result: &QuoteResult) -> bool {
        let Some(total) = result.total().filter(|_| result.is_ok()) else {
            return false;
        };
        self.push(RecentQuote {
            checked_at: Utc::now(),
            pincode: result.pincode.clone(),
            courier: result.courier.clone(),
            weight: result.weight,
            total,
        });
        true
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn push(&self, entry: RecentQuote) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Returns the entries, newest first.
    pub fn recent(&self) -> Vec<RecentQuote> {
        self.entries.lock().iter().rev().cloned().collect()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for QuoteLog {
    fn default() -> Self {
        Self::new(RECENT_QUOTE_LIMIT)
    }
}
