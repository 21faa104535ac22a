//! Order endpoints used by the mobile app.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use satwik_core::entities::order_records::OrderRecord;
use satwik_core::entities::rfc3339;
use satwik_core::store::StoreError;
use satwik_core::workflow::{SubmissionOutcome, SubmitError, submit_order};
use satwik_sdk::objects::{
    CreateOrderRequest, CreateOrderResponse, CustomerInfo, OrderFailedResponse, OrderResponse,
    OrderStatus,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
}

/// Convert an `OrderRecord` (DB model) into an `OrderResponse` (API model).
fn to_response(record: OrderRecord) -> OrderResponse {
    OrderResponse {
        order_id: record.order_id,
        accu360_order_id: record.accu360_order_id,
        status: record.status.into(),
        vendor_status: record.vendor_status,
        failure_reason: record.failure_reason,
        customer: CustomerInfo {
            name: record.customer_name,
            phone: record.customer_phone,
            address: record.customer_address,
        },
        items: record.items.0,
        subtotal: record.subtotal,
        delivery_fee: record.delivery_fee,
        total: record.total,
        delivery_notes: record.delivery_notes,
        created_at: rfc3339(record.created_at),
        updated_at: rfc3339(record.updated_at),
    }
}

/// `POST /orders`: record an order and forward it to Accu360.
///
/// Returns `201` once Accu360 accepted it. A vendor rejection returns
/// `502` with the stored order id; the order remains retrievable.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Response, OrdersApiError> {
    let outcome = submit_order(state.orders.as_ref(), state.vendor.as_ref(), &request).await?;

    let response = match outcome {
        SubmissionOutcome::Submitted(record) => (
            StatusCode::CREATED,
            Json(CreateOrderResponse {
                order_id: record.order_id,
                accu360_order_id: record.accu360_order_id,
                status: record.status.into(),
                message: "Order submitted to Accu360".to_string(),
                created_at: rfc3339(record.created_at),
            }),
        )
            .into_response(),
        SubmissionOutcome::Failed { record, error } => (
            StatusCode::BAD_GATEWAY,
            Json(OrderFailedResponse {
                order_id: record.order_id,
                status: OrderStatus::Failed,
                error,
            }),
        )
            .into_response(),
    };
    Ok(response)
}

/// `GET /orders/{order_id}`
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, OrdersApiError> {
    let record = state
        .orders
        .get_order(&order_id)
        .await?
        .ok_or(OrdersApiError::NotFound)?;
    Ok(Json(to_response(record)))
}

#[derive(Debug)]
enum OrdersApiError {
    /// The order failed validation.
    Invalid(String),
    /// The requested order was not found.
    NotFound,
    /// A store operation failed.
    Store(StoreError),
    /// The order vanished while it was being finalized.
    Internal(String),
}

impl From<StoreError> for OrdersApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<SubmitError> for OrdersApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(message) => Self::Invalid(message),
            SubmitError::Store(e) => Self::Store(e),
            SubmitError::RecordMissing(order_id) => Self::Internal(order_id),
        }
    }
}

impl IntoResponse for OrdersApiError {
    fn into_response(self) -> Response {
        match self {
            OrdersApiError::Invalid(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            OrdersApiError::NotFound => (StatusCode::NOT_FOUND, "order not found").into_response(),
            OrdersApiError::Store(e) => {
                tracing::error!(error = %e, "Orders API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            OrdersApiError::Internal(order_id) => {
                tracing::error!(order_id = %order_id, "Order record missing after insert");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
