//! TOML file configuration structures.
//!
//! These structs directly map to the `satwik-config.toml` file format.
//! Every section is optional so that a deployment can be configured from
//! the environment alone.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub vendor: VendorConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. `DATABASE_URL` takes precedence.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

/// Accu360 section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub default_city: Option<String>,
    #[serde(default)]
    pub default_province: Option<String>,
    #[serde(default = "default_customer_group")]
    pub customer_group: String,
    #[serde(default = "default_territory")]
    pub territory: String,
    /// Timeout for each outbound request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub oauth: Option<OAuthConfig>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            api_secret: None,
            default_city: None,
            default_province: None,
            customer_group: default_customer_group(),
            territory: default_territory(),
            timeout_secs: default_timeout_secs(),
            oauth: None,
        }
    }
}

fn default_customer_group() -> String {
    "Individual".to_string()
}

fn default_territory() -> String {
    "All Territories".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// `[vendor.oauth]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    /// Defaults to Frappe's `frappe.integrations.oauth2.authorize` under the base URL.
    #[serde(default)]
    pub authorize_url: Option<String>,
    /// Defaults to Frappe's `frappe.integrations.oauth2.get_token` under the base URL.
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            authorize_url: None,
            token_url: None,
            scope: default_scope(),
        }
    }
}

fn default_scope() -> String {
    "all openid".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret for `X-Frappe-Webhook-Signature`. Unsigned webhooks
    /// are accepted while this is unset.
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}
