//! Application state shared across request handlers.

use std::sync::Arc;

use stock_ledger_store::RocksStore;

use crate::config::ServiceConfig;
use crate::platform::CommercePlatform;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Persistent ledger storage.
    pub store: Arc<RocksStore>,

    /// Client for the host commerce platform's admin API.
    pub platform: Arc<dyn CommercePlatform>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create the shared state, warning about risky configuration.
    #[must_use]
    pub fn new(
        store: Arc<RocksStore>,
        platform: Arc<dyn CommercePlatform>,
        config: ServiceConfig,
    ) -> Self {
        if config.admin_api_key.is_none() {
            tracing::warn!("ADMIN_API_KEY not set; rebuild and purge endpoints are disabled");
        }
        if config.hook_secret.is_none() {
            tracing::warn!("HOOK_SECRET not set; accepting unsigned platform hooks");
        }

        Self {
            store,
            platform,
            config,
        }
    }
}
