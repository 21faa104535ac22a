//! Custom Axum extractors.
//!
//! Provides `WebhookBody<T>`, which verifies the Accu360 webhook signature
//! against the raw body before deserializing it.

use axum::{
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use satwik_sdk::signature::{
    self, LEGACY_WEBHOOK_SIGNATURE_HEADER, SignatureError, WEBHOOK_SIGNATURE_HEADER,
};
use serde::de::DeserializeOwned;

use crate::state::AppState;

/// Largest webhook body accepted.
const MAX_WEBHOOK_BODY: usize = 64 * 1024;

/// An Axum extractor that verifies the webhook signature header and
/// deserializes the JSON request body.
///
/// # Header format
///
/// ```text
/// X-Frappe-Webhook-Signature: {base64_signature}
/// ```
///
/// The signature is `HMAC-SHA256(raw_body, webhook_secret)`. The legacy
/// `X-Accu360-Signature` header is accepted as well. When no secret is
/// configured the signature is not checked.
pub struct WebhookBody<T>(pub T);

/// Errors that can occur during webhook verification.
#[derive(Debug, thiserror::Error)]
pub enum WebhookBodyError {
    #[error("missing webhook signature header")]
    MissingSignature,
    #[error("invalid webhook signature header")]
    InvalidHeader,
    #[error("invalid signature encoding")]
    InvalidBase64,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("invalid JSON body: {0}")]
    JsonError(serde_json::Error),
    #[error("signature verification failed")]
    VerificationFailed,
}

impl From<SignatureError> for WebhookBodyError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidFormat => Self::InvalidHeader,
            SignatureError::InvalidBase64 => Self::InvalidBase64,
            SignatureError::SignatureMismatch | SignatureError::Expired => Self::VerificationFailed,
        }
    }
}

impl IntoResponse for WebhookBodyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebhookBodyError::MissingSignature => {
                (StatusCode::UNAUTHORIZED, "missing webhook signature header")
            }
            WebhookBodyError::InvalidHeader => {
                (StatusCode::UNAUTHORIZED, "invalid webhook signature header")
            }
            WebhookBodyError::InvalidBase64 => {
                (StatusCode::UNAUTHORIZED, "invalid signature encoding")
            }
            WebhookBodyError::BodyReadError => {
                (StatusCode::BAD_REQUEST, "failed to read request body")
            }
            WebhookBodyError::JsonError(_) => (StatusCode::BAD_REQUEST, "invalid JSON body"),
            WebhookBodyError::VerificationFailed => {
                (StatusCode::UNAUTHORIZED, "signature verification failed")
            }
        };
        (status, message).into_response()
    }
}

fn signature_header(headers: &HeaderMap) -> Result<Option<String>, WebhookBodyError> {
    headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .or_else(|| headers.get(LEGACY_WEBHOOK_SIGNATURE_HEADER))
        .map(|value| {
            value
                .to_str()
                .map(str::to_owned)
                .map_err(|_| WebhookBodyError::InvalidHeader)
        })
        .transpose()
}

impl<T: DeserializeOwned + Send> FromRequest<AppState> for WebhookBody<T> {
    type Rejection = WebhookBodyError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = signature_header(req.headers())?;

        let body_bytes = axum::body::to_bytes(req.into_body(), MAX_WEBHOOK_BODY)
            .await
            .map_err(|_| WebhookBodyError::BodyReadError)?;

        let webhook = state.config.webhook.read().await;
        match webhook.secret_bytes() {
            Some(secret) => {
                let header_value = header_value.ok_or(WebhookBodyError::MissingSignature)?;
                signature::verify_webhook_body(&body_bytes, &header_value, secret)?;
            }
            None => {
                tracing::warn!("WEBHOOK_SECRET not configured, accepting unsigned webhook");
            }
        }
        drop(webhook);

        let payload = serde_json::from_slice(&body_bytes).map_err(WebhookBodyError::JsonError)?;
        Ok(WebhookBody(payload))
    }
}
