//! Webhook bodies sent by Accu360.

use serde::{Deserialize, Serialize};

/// Status update posted by Accu360 to `POST /webhooks/accu360`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accu360WebhookPayload {
    pub event: String,
    /// The Accu360 order id (Sales Order name).
    pub order_id: String,
    pub status: String,
    pub timestamp: String,
    /// Purchase-order reference, which carries the gateway's internal order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_no: Option<String>,
}

/// Acknowledgement returned to Accu360.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
    pub order_id: String,
}
