//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::db::SalesStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the sales store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    store: Arc<dyn SalesStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Dashboard configuration
    /// * `store` - Sales store (live database or in-memory)
    #[must_use]
    pub fn new(config: DashboardConfig, store: Arc<dyn SalesStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the dashboard configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Get a reference to the sales store.
    #[must_use]
    pub fn store(&self) -> &dyn SalesStore {
        self.inner.store.as_ref()
    }

    /// Get a shared handle to the sales store.
    #[must_use]
    pub fn store_handle(&self) -> Arc<dyn SalesStore> {
        Arc::clone(&self.inner.store)
    }
}
