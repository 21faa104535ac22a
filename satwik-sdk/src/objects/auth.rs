use serde::{Deserialize, Serialize};

/// Returned by the OAuth callback once a credential has been stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConnected {
    pub status: String,
    /// RFC 3339 expiry of the access token.
    pub expires_at: String,
}
