//! Configuration module for satwik-server.
//!
//! Handles loading configuration from the TOML file, environment
//! variables and CLI arguments, in increasing order of precedence.

pub mod file;

use crate::config::file::{FileConfig, OAuthConfig as FileOAuthConfig};
use satwik_core::config::{OAuthConfig, ServerConfig, SharedConfig, VendorConfig, WebhookConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL is not set (use --memory-store to run without PostgreSQL)")]
    MissingDatabaseUrl,
}

/// Database settings. Only read at startup.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn url(&self) -> Result<&str, ConfigError> {
        self.url.as_deref().ok_or(ConfigError::MissingDatabaseUrl)
    }
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub vendor: VendorConfig,
    pub vendor_timeout: Duration,
    pub webhook: WebhookConfig,
    pub allowed_origins: Vec<String>,
}

impl LoadedConfig {
    /// Convert the reloadable sections into a SharedConfig.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.vendor, self.webhook)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if it exists
    /// 2. Apply environment overrides
    /// 3. Apply CLI overrides
    /// 4. Validate and build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    fn load_with_env(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults and environment"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        apply_env(&mut file_config, env);

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        build_loaded_config(file_config)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

/// Override file values with the deployment's environment variables.
///
/// Empty variables are ignored.
fn apply_env(config: &mut FileConfig, env: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(url) = var("DATABASE_URL") {
        config.database.url = Some(url);
    }

    let vendor = &mut config.vendor;
    let overrides = [
        ("ACCU360_API_BASE_URL", &mut vendor.base_url),
        ("ACCU360_API_KEY", &mut vendor.api_key),
        ("ACCU360_API_SECRET", &mut vendor.api_secret),
        ("ACCU360_DEFAULT_CITY", &mut vendor.default_city),
        ("ACCU360_DEFAULT_PROVINCE", &mut vendor.default_province),
    ];
    for (name, slot) in overrides {
        if let Some(value) = var(name) {
            *slot = Some(value);
        }
    }

    let client_id = var("ACCU360_OAUTH_CLIENT_ID");
    let client_secret = var("ACCU360_OAUTH_CLIENT_SECRET");
    let redirect_uri = var("ACCU360_OAUTH_REDIRECT_URI");
    if client_id.is_some() || client_secret.is_some() || redirect_uri.is_some() {
        let oauth = vendor.oauth.get_or_insert_with(FileOAuthConfig::default);
        if let Some(value) = client_id {
            oauth.client_id = value;
        }
        if let Some(value) = client_secret {
            oauth.client_secret = value;
        }
        if let Some(value) = redirect_uri {
            oauth.redirect_uri = value;
        }
    }

    if let Some(secret) = var("WEBHOOK_SECRET") {
        config.webhook.secret = Some(secret);
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim())
        .map_err(|e| ConfigError::ValidationError(format!("invalid {field} {value:?}: {e}")))
}

/// Frappe serves its OAuth2 endpoints as whitelisted methods under the
/// site root, which may carry a path prefix.
fn frappe_method_url(base_url: Option<&Url>, method: &str) -> Result<Url, ConfigError> {
    let base_url = base_url.ok_or_else(|| {
        ConfigError::ValidationError(format!(
            "vendor.base_url is required to derive the OAuth {method} endpoint"
        ))
    })?;
    let method = format!("frappe.integrations.oauth2.{method}");
    let mut url = base_url.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| {
            ConfigError::ValidationError(format!("vendor.base_url cannot be a base: {base_url}"))
        })?
        .pop_if_empty()
        .extend(["api", "method", method.as_str()]);
    Ok(url)
}

fn convert_oauth(
    oauth: FileOAuthConfig,
    base_url: Option<&Url>,
) -> Result<OAuthConfig, ConfigError> {
    if oauth.client_id.trim().is_empty() || oauth.client_secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "vendor.oauth requires client_id and client_secret".to_string(),
        ));
    }
    let redirect_uri = parse_url("vendor.oauth.redirect_uri", &oauth.redirect_uri)?;
    let authorize_url = match &oauth.authorize_url {
        Some(url) => parse_url("vendor.oauth.authorize_url", url)?,
        None => frappe_method_url(base_url, "authorize")?,
    };
    let token_url = match &oauth.token_url {
        Some(url) => parse_url("vendor.oauth.token_url", url)?,
        None => frappe_method_url(base_url, "get_token")?,
    };
    Ok(OAuthConfig {
        client_id: oauth.client_id,
        client_secret: oauth.client_secret,
        redirect_uri,
        authorize_url,
        token_url,
        scope: oauth.scope,
    })
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let FileConfig {
        server,
        database,
        vendor,
        webhook,
        cors,
    } = file_config;

    let base_url = vendor
        .base_url
        .as_deref()
        .map(|url| parse_url("vendor.base_url", url))
        .transpose()?;
    let oauth = vendor
        .oauth
        .map(|oauth| convert_oauth(oauth, base_url.as_ref()))
        .transpose()?;

    if vendor.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "vendor.timeout_secs must be positive".to_string(),
        ));
    }

    Ok(LoadedConfig {
        server: ServerConfig {
            listen: server.listen,
        },
        database: DatabaseSettings {
            url: database.url,
            max_connections: database.max_connections.max(1),
        },
        vendor_timeout: Duration::from_secs(vendor.timeout_secs),
        vendor: VendorConfig {
            base_url,
            api_key: vendor.api_key,
            api_secret: vendor.api_secret,
            default_city: vendor.default_city,
            default_province: vendor.default_province,
            customer_group: vendor.customer_group,
            territory: vendor.territory,
            oauth,
        },
        webhook: WebhookConfig::new(webhook.secret),
        allowed_origins: cors.allowed_origins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn environment_overrides_file() {
        let mut config: FileConfig = toml::from_str(
            r#"
[vendor]
base_url = "https://old.example.com"
api_key = "file-key"
"#,
        )
        .unwrap();
        apply_env(
            &mut config,
            env(&[
                ("DATABASE_URL", "postgres://localhost/satwik"),
                ("ACCU360_API_BASE_URL", "https://satwik.accu360.cloud"),
                ("ACCU360_API_SECRET", "env-secret"),
                ("ACCU360_DEFAULT_CITY", ""),
                ("WEBHOOK_SECRET", "hook"),
            ]),
        );
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/satwik"));
        assert_eq!(
            config.vendor.base_url.as_deref(),
            Some("https://satwik.accu360.cloud")
        );
        assert_eq!(config.vendor.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.vendor.api_secret.as_deref(), Some("env-secret"));
        assert!(config.vendor.default_city.is_none());
        assert!(config.vendor.oauth.is_none());

        let loaded = build_loaded_config(config).unwrap();
        assert!(loaded.vendor.is_configured());
        assert!(loaded.webhook.secret_bytes().is_some());
        assert_eq!(loaded.database.url().unwrap(), "postgres://localhost/satwik");
    }

    #[test]
    fn oauth_from_environment_derives_frappe_endpoints() {
        let mut config = FileConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("ACCU360_API_BASE_URL", "https://satwik.accu360.cloud"),
                ("ACCU360_OAUTH_CLIENT_ID", "gateway"),
                ("ACCU360_OAUTH_CLIENT_SECRET", "client-secret"),
                (
                    "ACCU360_OAUTH_REDIRECT_URI",
                    "https://orders.example.com/auth/accu360/callback",
                ),
            ]),
        );
        let loaded = build_loaded_config(config).unwrap();
        let oauth = loaded.vendor.oauth.unwrap();
        assert_eq!(oauth.scope, "all openid");
        assert_eq!(
            oauth.token_url.as_str(),
            "https://satwik.accu360.cloud/api/method/frappe.integrations.oauth2.get_token"
        );
        assert_eq!(
            oauth.authorize_url.as_str(),
            "https://satwik.accu360.cloud/api/method/frappe.integrations.oauth2.authorize"
        );
    }

    #[test]
    fn derived_oauth_endpoints_keep_base_path() {
        let base = Url::parse("https://example.com/erp/").unwrap();
        assert_eq!(
            frappe_method_url(Some(&base), "get_token").unwrap().as_str(),
            "https://example.com/erp/api/method/frappe.integrations.oauth2.get_token"
        );
        assert!(frappe_method_url(None, "authorize").is_err());
    }

    #[test]
    fn invalid_urls_are_rejected() {
        let mut config = FileConfig::default();
        config.vendor.base_url = Some("not a url".to_string());
        assert!(matches!(
            build_loaded_config(config),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = FileConfig::default();
        apply_env(
            &mut config,
            env(&[
                ("ACCU360_API_BASE_URL", "https://satwik.accu360.cloud"),
                ("ACCU360_OAUTH_CLIENT_ID", "gateway"),
                ("ACCU360_OAUTH_CLIENT_SECRET", "client-secret"),
                ("ACCU360_OAUTH_REDIRECT_URI", "/relative"),
            ]),
        );
        assert!(matches!(
            build_loaded_config(config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn database_url_is_required_when_asked_for() {
        let loaded = build_loaded_config(FileConfig::default()).unwrap();
        assert!(matches!(
            loaded.database.url(),
            Err(ConfigError::MissingDatabaseUrl)
        ));
        assert!(!loaded.vendor.is_configured());
    }

    #[test]
    fn missing_file_means_defaults() {
        let loader = ConfigLoader::new(
            "/nonexistent/satwik-config.toml",
            Some(SocketAddr::from(([127, 0, 0, 1], 9000))),
        );
        let loaded = loader.load_with_env(env(&[])).unwrap();
        assert_eq!(loaded.server.listen.port(), 9000);
        assert!(loaded.database.url.is_none());
        assert!(loaded.vendor.base_url.is_none());
        assert!(loaded.webhook.secret_bytes().is_none());
    }
}
