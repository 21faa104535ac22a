//! Shared fixtures for router tests.

use crate::server::{build_router, cors_layer};
use crate::state::AppState;
use async_trait::async_trait;
use axum::Router;
use axum::response::Response;
use rust_decimal::Decimal;
use satwik_core::config::{OAuthConfig, ServerConfig, SharedConfig, VendorConfig, WebhookConfig};
use satwik_core::entities::order_records::{InsertOrderRecord, OrderRecord};
use satwik_core::store::{MemoryStore, OrderStore};
pub use satwik_core::testing::FakeVendor;
use satwik_core::vendor::{CredentialManager, OAuthError, TokenExchange, TokenResponse};
use satwik_core::workflow::{SubmissionOutcome, submit_order};
use satwik_sdk::objects::{CreateOrderRequest, OrderItem};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Token endpoint double that grants `access-for-{code}`.
pub struct FakeTokens;

#[async_trait]
impl TokenExchange for FakeTokens {
    async fn exchange_code(
        &self,
        _config: &OAuthConfig,
        code: &str,
    ) -> Result<TokenResponse, OAuthError> {
        Ok(TokenResponse {
            access_token: format!("access-for-{code}"),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(3600),
            refresh_token: Some("refresh".to_string()),
            scope: None,
        })
    }

    async fn refresh(
        &self,
        _config: &OAuthConfig,
        _refresh_token: &str,
    ) -> Result<TokenResponse, OAuthError> {
        Err(OAuthError::InvalidResponse("refresh not expected".to_string()))
    }
}

pub fn vendor_config() -> VendorConfig {
    VendorConfig {
        base_url: Some(Url::parse("https://erp.example.com").unwrap()),
        api_key: Some("key".to_string()),
        api_secret: Some("secret".to_string()),
        default_city: Some("Dar es Salaam".to_string()),
        default_province: Some("Dar es Salaam".to_string()),
        customer_group: "Individual".to_string(),
        territory: "All Territories".to_string(),
        oauth: None,
    }
}

pub fn oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "gateway".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: Url::parse("https://gw.example.com/auth/accu360/callback").unwrap(),
        authorize_url: Url::parse(
            "https://erp.example.com/api/method/frappe.integrations.oauth2.authorize",
        )
        .unwrap(),
        token_url: Url::parse(
            "https://erp.example.com/api/method/frappe.integrations.oauth2.get_token",
        )
        .unwrap(),
        scope: "all openid".to_string(),
    }
}

/// Order body as the mobile app sends it.
pub fn order_json() -> serde_json::Value {
    json!({
        "customer_name": "Asha Mrema",
        "customer_phone": "+255712345678",
        "customer_address": "Plot 12, Mikocheni",
        "items": [{
            "product_id": "eggs-30",
            "accu360_sku": "EGG-TRAY-30",
            "name": "Egg tray (30)",
            "quantity": 2,
            "unit_price": 12500,
            "total_price": 25000
        }],
        "subtotal": 25000,
        "delivery_fee": 2000,
        "total": 27000,
        "delivery_notes": "Leave at the gate"
    })
}

pub fn order_request() -> CreateOrderRequest {
    serde_json::from_value(order_json()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Application state over an in-memory store and fake vendor.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub vendor: Arc<FakeVendor>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(
            Arc::new(FakeVendor::accepting()),
            vendor_config(),
            Some(WEBHOOK_SECRET),
        )
    }

    pub fn with_vendor(vendor: Arc<FakeVendor>) -> Self {
        Self::build(vendor, vendor_config(), Some(WEBHOOK_SECRET))
    }

    pub fn with_oauth() -> Self {
        let mut vendor = vendor_config();
        vendor.oauth = Some(oauth_config());
        Self::build(
            Arc::new(FakeVendor::accepting()),
            vendor,
            Some(WEBHOOK_SECRET),
        )
    }

    pub fn without_webhook_secret() -> Self {
        Self::build(Arc::new(FakeVendor::accepting()), vendor_config(), None)
    }

    fn build(vendor: Arc<FakeVendor>, vendor_config: VendorConfig, secret: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let credentials = Arc::new(CredentialManager::new(store.clone(), Arc::new(FakeTokens)));
        let config = SharedConfig::new(
            ServerConfig {
                listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            },
            vendor_config,
            WebhookConfig::new(secret.map(str::to_string)),
        );
        let state = AppState::new(store.clone(), credentials, vendor.clone(), config);
        Self {
            state,
            store,
            vendor,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), cors_layer(&[]))
    }

    /// An order that went through the vendor successfully.
    pub async fn submitted_order(&self) -> OrderRecord {
        match submit_order(self.store.as_ref(), self.vendor.as_ref(), &order_request())
            .await
            .unwrap()
        {
            SubmissionOutcome::Submitted(record) => record,
            SubmissionOutcome::Failed { error, .. } => panic!("submission failed: {error}"),
        }
    }

    /// An order stored as `created` that never reached the vendor.
    pub async fn recorded_order(&self) -> OrderRecord {
        let request = order_request();
        self.store
            .insert_order(InsertOrderRecord {
                order_id: "SF-20260201-00042".to_string(),
                customer_name: request.customer_name,
                customer_phone: request.customer_phone,
                customer_address: request.customer_address,
                items: vec![OrderItem {
                    product_id: "milk-1l".to_string(),
                    accu360_sku: "MILK-1L".to_string(),
                    name: "Fresh milk (1L)".to_string(),
                    quantity: 1,
                    unit_price: Decimal::new(3000, 0),
                    total_price: Decimal::new(3000, 0),
                }],
                subtotal: Decimal::new(3000, 0),
                delivery_fee: Decimal::ZERO,
                total: Decimal::new(3000, 0),
                delivery_notes: None,
            })
            .await
            .unwrap()
    }
}
