//! Inbound webhook configuration.

/// Settings for verifying Accu360 webhooks.
#[derive(Clone, Default)]
pub struct WebhookConfig {
    /// Shared HMAC secret. When absent, unsigned webhooks are accepted.
    pub secret: Option<Box<[u8]>>,
}

impl WebhookConfig {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.into_bytes().into_boxed_slice()),
        }
    }

    /// Get the secret key bytes for HMAC verification.
    pub fn secret_bytes(&self) -> Option<&[u8]> {
        self.secret.as_deref()
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
