use crate::entities::order_records::{
    InsertOrderRecord, MarkOrderFailed, MarkOrderSubmitted, OrderRecord, generate_order_id,
};
use crate::store::{OrderStore, StoreError};
use crate::vendor::OrderVendor;
use rust_decimal::Decimal;
use satwik_sdk::objects::CreateOrderRequest;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Attempts at drawing an unused order id before giving up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Amounts are stored as `NUMERIC(14, 2)`.
const MONEY_SCALE: u32 = 2;
const MONEY_INTEGER_DIGITS: u32 = 12;

/// Reject amounts the `orders` table would round or overflow.
fn check_amount(field: &str, amount: Decimal) -> Result<(), SubmitError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(SubmitError::Invalid(format!(
            "{field} has more than {MONEY_SCALE} decimal places"
        )));
    }
    if amount.abs().trunc() >= Decimal::from(10_i64.pow(MONEY_INTEGER_DIGITS)) {
        return Err(SubmitError::Invalid(format!("{field} is too large")));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request failed validation; nothing was stored.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record disappeared between insert and finalization.
    #[error("order record vanished: {0}")]
    RecordMissing(String),
}

/// Final state of a submission. Both variants are persisted.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Submitted(OrderRecord),
    Failed { record: OrderRecord, error: String },
}

impl SubmissionOutcome {
    pub fn record(&self) -> &OrderRecord {
        match self {
            SubmissionOutcome::Submitted(record) => record,
            SubmissionOutcome::Failed { record, .. } => record,
        }
    }
}

/// Check an order before anything is stored.
pub fn validate_order(request: &CreateOrderRequest) -> Result<(), SubmitError> {
    if request.customer_name.trim().is_empty() {
        return Err(SubmitError::Invalid("customer_name is required".to_string()));
    }
    if request.customer_phone.trim().is_empty() {
        return Err(SubmitError::Invalid("customer_phone is required".to_string()));
    }
    if request.items.is_empty() {
        return Err(SubmitError::Invalid(
            "order must contain at least one item".to_string(),
        ));
    }

    let missing_sku: Vec<&str> = request
        .items
        .iter()
        .filter(|item| item.accu360_sku.trim().is_empty())
        .map(|item| item.product_id.as_str())
        .collect();
    if !missing_sku.is_empty() {
        return Err(SubmitError::Invalid(format!(
            "Products missing Accu360 SKU: {}",
            missing_sku.join(", ")
        )));
    }

    if let Some(item) = request.items.iter().find(|item| item.quantity == 0) {
        return Err(SubmitError::Invalid(format!(
            "quantity must be positive for product {}",
            item.product_id
        )));
    }

    for item in &request.items {
        check_amount(&format!("unit_price of {}", item.product_id), item.unit_price)?;
        check_amount(&format!("total_price of {}", item.product_id), item.total_price)?;
    }
    check_amount("subtotal", request.subtotal)?;
    check_amount("delivery_fee", request.delivery_fee)?;
    check_amount("total", request.total)?;
    Ok(())
}

async fn insert_with_fresh_id(
    store: &dyn OrderStore,
    request: &CreateOrderRequest,
) -> Result<OrderRecord, SubmitError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let insert = InsertOrderRecord {
            order_id: generate_order_id(OffsetDateTime::now_utc()),
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            customer_address: request.customer_address.clone(),
            items: request.items.clone(),
            subtotal: request.subtotal,
            delivery_fee: request.delivery_fee,
            total: request.total,
            delivery_notes: request.delivery_notes.clone(),
        };
        match store.insert_order(insert).await {
            Ok(record) => return Ok(record),
            Err(StoreError::DuplicateOrderId(id)) if attempt < MAX_ID_ATTEMPTS => {
                warn!(order_id = %id, attempt, "Order id collision, drawing a new one");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Record an order, submit it to the vendor and store the result.
///
/// A vendor failure is not an error here: the order is stored as `failed`
/// and returned as [`SubmissionOutcome::Failed`].
pub async fn submit_order(
    store: &dyn OrderStore,
    vendor: &dyn OrderVendor,
    request: &CreateOrderRequest,
) -> Result<SubmissionOutcome, SubmitError> {
    validate_order(request)?;
    let record = insert_with_fresh_id(store, request).await?;
    let order_id = record.order_id.clone();
    info!(order_id = %order_id, items = request.items.len(), total = %request.total, "Order recorded");

    let receipt = match vendor.submit_order(&order_id, request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            let error = e.to_string();
            warn!(order_id = %order_id, error = %error, "Accu360 submission failed");
            return record_failure(store, order_id, error).await;
        }
    };

    let accu360_order_id = receipt.accu360_order_id;
    let finalized = store
        .mark_submitted(MarkOrderSubmitted {
            order_id: order_id.clone(),
            accu360_order_id: accu360_order_id.clone(),
        })
        .await;
    match finalized {
        Ok(Some(record)) => {
            info!(
                order_id = %order_id,
                accu360_order_id = record.accu360_order_id.as_deref().unwrap_or("<none>"),
                "Order submitted to Accu360"
            );
            Ok(SubmissionOutcome::Submitted(record))
        }
        Ok(None) => Err(SubmitError::RecordMissing(order_id)),
        // The vendor has the order but it could not be linked here; the
        // record must still leave `created`.
        Err(e) => {
            let error = format!(
                "Accu360 accepted the order as {} but it could not be recorded: {e}",
                accu360_order_id.as_deref().unwrap_or("<none>")
            );
            tracing::error!(order_id = %order_id, error = %error, "Failed to finalize order");
            record_failure(store, order_id, error).await
        }
    }
}

async fn record_failure(
    store: &dyn OrderStore,
    order_id: String,
    error: String,
) -> Result<SubmissionOutcome, SubmitError> {
    let record = store
        .mark_failed(MarkOrderFailed {
            order_id: order_id.clone(),
            reason: error.clone(),
        })
        .await?
        .ok_or(SubmitError::RecordMissing(order_id))?;
    Ok(SubmissionOutcome::Failed { record, error })
}
