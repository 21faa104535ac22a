//! Accu360 vendor configuration.

use url::Url;

/// Connection settings for the Accu360 API.
#[derive(Clone)]
pub struct VendorConfig {
    /// Root URL of the Accu360 site, e.g. `https://erp.example.com`.
    pub base_url: Option<Url>,
    /// API key for `token` authentication.
    pub api_key: Option<String>,
    /// API secret for `token` authentication.
    pub api_secret: Option<String>,
    /// City used for shipping addresses.
    pub default_city: Option<String>,
    /// Province used for shipping addresses.
    pub default_province: Option<String>,
    /// Customer group for newly created customers.
    pub customer_group: String,
    /// Territory for newly created customers.
    pub territory: String,
    /// OAuth2 client. When present, it takes precedence over the API key.
    pub oauth: Option<OAuthConfig>,
}

impl VendorConfig {
    /// Whether the gateway has some way to authenticate to Accu360.
    pub fn has_credentials(&self) -> bool {
        self.oauth.is_some() || self.token_credentials().is_some()
    }

    /// Whether orders can be forwarded at all.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.has_credentials()
    }

    /// API key and secret, when both are set.
    pub fn token_credentials(&self) -> Option<(&str, &str)> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some((key.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }

    /// Default city and province for shipping addresses, when both are set.
    pub fn address_defaults(&self) -> Option<(&str, &str)> {
        match (&self.default_city, &self.default_province) {
            (Some(city), Some(province)) if !city.is_empty() && !province.is_empty() => {
                Some((city.as_str(), province.as_str()))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for VendorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorConfig")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("default_city", &self.default_city)
            .field("default_province", &self.default_province)
            .field("customer_group", &self.customer_group)
            .field("territory", &self.territory)
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// OAuth2 authorization-code client registered with Accu360.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered for the client; points at
    /// `/auth/accu360/callback`.
    pub redirect_uri: Url,
    pub authorize_url: Url,
    pub token_url: Url,
    pub scope: String,
}

impl OAuthConfig {
    /// Key used to sign the `state` parameter.
    pub fn state_key(&self) -> &[u8] {
        self.client_secret.as_bytes()
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("authorize_url", &self.authorize_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("scope", &self.scope)
            .finish()
    }
}
