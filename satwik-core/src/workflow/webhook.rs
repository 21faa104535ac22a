use crate::entities::order_records::{ApplyVendorStatus, OrderRecord, OrderStatus};
use crate::store::{OrderStore, StoreError};
use satwik_sdk::objects::Accu360WebhookPayload;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum WebhookApplyError {
    #[error("order not found: {0}")]
    NotFound(String),

    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    /// `po_no` names an order already linked to a different Sales Order.
    #[error("order {order_id} is linked to {linked}, not {reported}")]
    VendorIdMismatch {
        order_id: String,
        linked: String,
        reported: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve the order a webhook refers to.
///
/// Returns the record and the vendor id to fill in, if any.
async fn find_order(
    store: &dyn OrderStore,
    payload: &Accu360WebhookPayload,
) -> Result<(OrderRecord, Option<String>), WebhookApplyError> {
    if let Some(record) = store.get_order_by_vendor_id(&payload.order_id).await? {
        return Ok((record, None));
    }

    let po_no = payload
        .po_no
        .as_deref()
        .map(str::trim)
        .filter(|po| !po.is_empty());
    if let Some(po_no) = po_no {
        if let Some(record) = store.get_order(po_no).await? {
            return match &record.accu360_order_id {
                None => Ok((record, Some(payload.order_id.clone()))),
                Some(linked) => {
                    warn!(
                        order_id = %record.order_id,
                        linked = %linked,
                        reported = %payload.order_id,
                        "Webhook po_no points at an order linked to another Sales Order"
                    );
                    Err(WebhookApplyError::VendorIdMismatch {
                        order_id: record.order_id.clone(),
                        linked: linked.clone(),
                        reported: payload.order_id.clone(),
                    })
                }
            };
        }
    }

    // Some senders put the internal id in `order_id`.
    store
        .get_order(&payload.order_id)
        .await?
        .map(|record| (record, None))
        .ok_or_else(|| WebhookApplyError::NotFound(payload.order_id.clone()))
}

/// Apply a vendor status update and return the updated record.
///
/// Unknown statuses and unknown orders leave every record untouched.
pub async fn apply_webhook(
    store: &dyn OrderStore,
    payload: &Accu360WebhookPayload,
) -> Result<OrderRecord, WebhookApplyError> {
    let status = OrderStatus::from_vendor_status(&payload.status)
        .ok_or_else(|| WebhookApplyError::UnknownStatus(payload.status.clone()))?;

    let (record, accu360_order_id) = find_order(store, payload).await?;

    let updated = store
        .apply_vendor_status(ApplyVendorStatus {
            order_id: record.order_id.clone(),
            status,
            vendor_status: payload.status.clone(),
            accu360_order_id,
        })
        .await?
        .ok_or(WebhookApplyError::NotFound(record.order_id))?;

    info!(
        order_id = %updated.order_id,
        event = %payload.event,
        from = ?record.status,
        to = ?updated.status,
        "Applied Accu360 status update"
    );
    Ok(updated)
}
