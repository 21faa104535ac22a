//! Signature algorithms used by the gateway.
//!
//! Two schemes exist:
//!
//! * **Webhook body signing** (Accu360 → gateway), the Frappe webhook scheme:
//!
//!   ```text
//!   X-Frappe-Webhook-Signature: base64(HMAC-SHA256(raw_body, webhook_secret))
//!   ```
//!
//! * **OAuth state signing** (gateway → vendor authorize page → gateway):
//!
//!   ```text
//!   state = {unix_timestamp}.{nonce}.{base64(HMAC-SHA256("{unix_timestamp}.{nonce}", key))}
//!   ```

/// Header carrying the webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Frappe-Webhook-Signature";

/// Alternative webhook signature header accepted for Accu360 deployments.
pub const LEGACY_WEBHOOK_SIGNATURE_HEADER: &str = "X-Accu360-Signature";

/// Maximum allowed age of an OAuth state value (in seconds).
pub const MAX_STATE_AGE: i64 = 10 * 60;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

fn hmac_key(key: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key)
}

// ---------------------------------------------------------------------------
// Base64
// ---------------------------------------------------------------------------

/// Standard (padded) base64, as produced by Frappe.
pub fn encode_base64(bytes: &[u8]) -> String {
    let mut encoded = fast32::base64::RFC4648_NOPAD.encode(bytes);
    while encoded.len() % 4 != 0 {
        encoded.push('=');
    }
    encoded
}

/// Decode standard base64, with or without padding.
pub fn decode_base64(value: &str) -> Result<Vec<u8>, SignatureError> {
    fast32::base64::RFC4648_NOPAD
        .decode_str(value.trim().trim_end_matches('='))
        .map_err(|_| SignatureError::InvalidBase64)
}

// ---------------------------------------------------------------------------
// Webhook body signing
// ---------------------------------------------------------------------------

/// Compute the webhook signature header value for `body`.
pub fn sign_webhook_body(body: &[u8], secret: &[u8]) -> String {
    let tag = ring::hmac::sign(&hmac_key(secret), body);
    encode_base64(tag.as_ref())
}

/// Verify a webhook signature header value against the raw request body.
pub fn verify_webhook_body(
    body: &[u8],
    header_value: &str,
    secret: &[u8],
) -> Result<(), SignatureError> {
    if header_value.trim().is_empty() {
        return Err(SignatureError::InvalidFormat);
    }
    let signature = decode_base64(header_value)?;
    ring::hmac::verify(&hmac_key(secret), body, &signature)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// OAuth state
// ---------------------------------------------------------------------------

/// Create a fresh OAuth `state` value signed with `key`.
pub fn sign_state(key: &[u8]) -> String {
    let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
    let nonce: [u8; 16] = rand::random();
    sign_state_at(key, timestamp, &fast32::base64::RFC4648_URL_NOPAD.encode(&nonce))
}

/// Create an OAuth `state` value for a given timestamp and nonce.
///
/// The nonce must not contain `.`.
pub fn sign_state_at(key: &[u8], timestamp: i64, nonce: &str) -> String {
    let data = format!("{timestamp}.{nonce}");
    let tag = ring::hmac::sign(&hmac_key(key), data.as_bytes());
    format!(
        "{data}.{}",
        fast32::base64::RFC4648_URL_NOPAD.encode(tag.as_ref())
    )
}

/// Verify an OAuth `state` value against `key` and the current time.
pub fn verify_state(state: &str, key: &[u8]) -> Result<(), SignatureError> {
    verify_state_at(state, key, time::OffsetDateTime::now_utc().unix_timestamp())
}

/// Verify an OAuth `state` value as of `now` (unix seconds).
pub fn verify_state_at(state: &str, key: &[u8], now: i64) -> Result<(), SignatureError> {
    let (data, signature) = state.rsplit_once('.').ok_or(SignatureError::InvalidFormat)?;
    let (timestamp, nonce) = data.split_once('.').ok_or(SignatureError::InvalidFormat)?;
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidFormat)?;
    if nonce.is_empty() {
        return Err(SignatureError::InvalidFormat);
    }
    let signature = fast32::base64::RFC4648_URL_NOPAD
        .decode_str(signature)
        .map_err(|_| SignatureError::InvalidBase64)?;
    ring::hmac::verify(&hmac_key(key), data.as_bytes(), &signature)?;
    if now - timestamp > MAX_STATE_AGE || timestamp - now > MAX_STATE_AGE {
        return Err(SignatureError::Expired);
    }
    Ok(())
}
