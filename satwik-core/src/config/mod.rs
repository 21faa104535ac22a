//! Runtime configuration types for the order gateway.
//!
//! These types represent the validated runtime configuration. Loading and
//! parsing (TOML file, environment, CLI) is handled by the server crate.

mod server;
mod vendor;
mod webhook;

pub use server::ServerConfig;
pub use vendor::{OAuthConfig, VendorConfig};
pub use webhook::WebhookConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// The vendor and webhook sections can be swapped at runtime (SIGHUP).
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Accu360 connection settings and credentials.
    pub vendor: Arc<RwLock<VendorConfig>>,
    /// Inbound webhook verification settings.
    pub webhook: Arc<RwLock<WebhookConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, vendor: VendorConfig, webhook: WebhookConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            vendor: Arc::new(RwLock::new(vendor)),
            webhook: Arc::new(RwLock::new(webhook)),
        }
    }
}
