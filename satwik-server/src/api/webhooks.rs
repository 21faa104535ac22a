//! Inbound Accu360 webhooks.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use satwik_core::workflow::{WebhookApplyError, apply_webhook};
use satwik_sdk::objects::{Accu360WebhookPayload, WebhookAck};

use crate::api::extractors::WebhookBody;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/accu360", post(accu360_webhook))
}

/// `POST /webhooks/accu360`: apply a status update reported by Accu360.
async fn accu360_webhook(
    State(state): State<AppState>,
    WebhookBody(payload): WebhookBody<Accu360WebhookPayload>,
) -> Result<Json<WebhookAck>, WebhookApiError> {
    let record = apply_webhook(state.orders.as_ref(), &payload).await?;
    Ok(Json(WebhookAck {
        status: "ok".to_string(),
        order_id: record.order_id,
    }))
}

#[derive(Debug)]
struct WebhookApiError(WebhookApplyError);

impl From<WebhookApplyError> for WebhookApiError {
    fn from(e: WebhookApplyError) -> Self {
        Self(e)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        match self.0 {
            WebhookApplyError::NotFound(order_id) => {
                tracing::warn!(order_id = %order_id, "Webhook for unknown order");
                (StatusCode::NOT_FOUND, "order not found").into_response()
            }
            WebhookApplyError::UnknownStatus(status) => {
                tracing::warn!(status = %status, "Webhook with unknown status");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("unknown order status: {status}"),
                )
                    .into_response()
            }
            e @ WebhookApplyError::VendorIdMismatch { .. } => {
                (StatusCode::CONFLICT, e.to_string()).into_response()
            }
            WebhookApplyError::Store(e) => {
                tracing::error!(error = %e, "Webhook store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{TestApp, WEBHOOK_SECRET, body_json};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use satwik_core::entities::order_records::OrderStatus;
    use satwik_core::store::OrderStore;
    use satwik_sdk::signature::{
        LEGACY_WEBHOOK_SIGNATURE_HEADER, WEBHOOK_SIGNATURE_HEADER, sign_webhook_body,
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn webhook(body: &serde_json::Value, signature: Option<(&str, String)>) -> Request<Body> {
        let mut builder =
            Request::post("/webhooks/accu360").header(header::CONTENT_TYPE, "application/json");
        if let Some((name, value)) = signature {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn signed(body: &serde_json::Value) -> Option<(&'static str, String)> {
        let bytes = body.to_string();
        Some((
            WEBHOOK_SIGNATURE_HEADER,
            sign_webhook_body(bytes.as_bytes(), WEBHOOK_SECRET.as_bytes()),
        ))
    }

    fn status_update(order_id: &str, status: &str) -> serde_json::Value {
        json!({
            "event": "order.status_changed",
            "order_id": order_id,
            "status": status,
            "timestamp": "2026-02-01T10:00:00Z",
        })
    }

    #[tokio::test]
    async fn signed_update_changes_status() {
        let app = TestApp::new();
        let record = app.submitted_order().await;
        let body = status_update("SAL-ORD-2026-00001", "To Deliver and Bill");

        let response = app.router().oneshot(webhook(&body, signed(&body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let ack = body_json(response).await;
        assert_eq!(ack["status"], "ok");
        assert_eq!(ack["order_id"], record.order_id.as_str());

        let stored = app.store.get_order(&record.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Accepted);
        assert_eq!(stored.vendor_status.as_deref(), Some("To Deliver and Bill"));
    }

    #[tokio::test]
    async fn legacy_header_is_accepted() {
        let app = TestApp::new();
        app.submitted_order().await;
        let body = status_update("SAL-ORD-2026-00001", "delivered");
        let signature = sign_webhook_body(body.to_string().as_bytes(), WEBHOOK_SECRET.as_bytes());

        let response = app
            .router()
            .oneshot(webhook(
                &body,
                Some((LEGACY_WEBHOOK_SIGNATURE_HEADER, signature)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_or_missing_signature_is_rejected_without_mutation() {
        let app = TestApp::new();
        let record = app.submitted_order().await;
        let body = status_update("SAL-ORD-2026-00001", "delivered");

        let response = app.router().oneshot(webhook(&body, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let forged = Some((
            WEBHOOK_SIGNATURE_HEADER,
            sign_webhook_body(body.to_string().as_bytes(), b"wrong-secret"),
        ));
        let response = app.router().oneshot(webhook(&body, forged)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let stored = app.store.get_order(&record.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Submitted);
    }

    #[tokio::test]
    async fn unsigned_webhook_accepted_without_secret() {
        let app = TestApp::without_webhook_secret();
        app.submitted_order().await;
        let body = status_update("SAL-ORD-2026-00001", "completed");
        let response = app.router().oneshot(webhook(&body, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found_and_nothing_changes() {
        let app = TestApp::new();
        let record = app.submitted_order().await;
        let body = status_update("SAL-ORD-2026-09999", "delivered");

        let response = app.router().oneshot(webhook(&body, signed(&body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let stored = app.store.get_order(&record.order_id).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn unknown_status_is_unprocessable() {
        let app = TestApp::new();
        app.submitted_order().await;
        let body = status_update("SAL-ORD-2026-00001", "lost at sea");
        let response = app.router().oneshot(webhook(&body, signed(&body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn po_no_of_linked_order_conflicts() {
        let app = TestApp::new();
        let record = app.submitted_order().await;
        let mut body = status_update("SAL-ORD-2026-00500", "Completed");
        body["po_no"] = json!(record.order_id);

        let response = app.router().oneshot(webhook(&body, signed(&body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let stored = app.store.get_order(&record.order_id).await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn po_no_links_vendor_id() {
        let app = TestApp::new();
        let record = app.recorded_order().await;
        let mut body = status_update("SAL-ORD-2026-00042", "To Deliver");
        body["po_no"] = json!(record.order_id);

        let response = app.router().oneshot(webhook(&body, signed(&body))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stored = app.store.get_order(&record.order_id).await.unwrap().unwrap();
        assert_eq!(stored.accu360_order_id.as_deref(), Some("SAL-ORD-2026-00042"));
        assert_eq!(stored.status, OrderStatus::Accepted);
    }
}
