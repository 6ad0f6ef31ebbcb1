//! Application state for the Courier Quote Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::CourierCatalog;
use crate::error::EngineResult;
use crate::history::QuoteLog;

/// Shared application state.
///
/// Holds the current catalog snapshot and the recent-quote log. Handlers
/// take a snapshot per request, so a concurrent upsert never changes the
/// couriers a running batch sees.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<Arc<CourierCatalog>>>,
    recent: Arc<QuoteLog>,
}

impl AppState {
    /// Creates a new application state with the given catalog.
    pub fn new(catalog: CourierCatalog) -> Self {
        Self::with_log(catalog, QuoteLog::default())
    }

    /// Creates a new application state with a custom recent-quote log.
    pub fn with_log(catalog: CourierCatalog, recent: QuoteLog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            recent: Arc::new(recent),
        }
    }

    /// Returns the current catalog snapshot.
    pub fn catalog(&self) -> Arc<CourierCatalog> {
        self.catalog.read().clone()
    }

    /// Replaces the catalog with one derived from the current snapshot.
    ///
    /// The write lock is held while `update` runs, so concurrent updates
    /// apply one after another. On error the catalog is unchanged.
    pub fn update_catalog<F>(&self, update: F) -> EngineResult<Arc<CourierCatalog>>
    where
        F: FnOnce(&CourierCatalog) -> EngineResult<CourierCatalog>,
    {
        let mut guard = self.catalog.write();
        let next = Arc::new(update(&**guard)?);
        *guard = Arc::clone(&next);
        Ok(next)
    }

    /// Returns the recent-quote log.
    pub fn recent(&self) -> &QuoteLog {
        &self.recent
    }
}
