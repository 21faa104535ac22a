//! Application state shared across all request handlers.

use satwik_core::config::SharedConfig;
use satwik_core::store::OrderStore;
use satwik_core::vendor::{CredentialManager, OrderVendor};
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Order persistence (PostgreSQL, or in-memory for development).
    pub orders: Arc<dyn OrderStore>,
    /// Accu360 token lifecycle, used by the OAuth endpoints.
    pub credentials: Arc<CredentialManager>,
    /// Where orders are forwarded.
    pub vendor: Arc<dyn OrderVendor>,
    /// Runtime configuration (vendor and webhook sections reload on SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        credentials: Arc<CredentialManager>,
        vendor: Arc<dyn OrderVendor>,
        config: SharedConfig,
    ) -> Self {
        Self {
            orders,
            credentials,
            vendor,
            config,
        }
    }
}
