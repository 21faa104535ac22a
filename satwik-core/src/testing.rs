//! Test doubles shared by this crate's tests and the server's router tests.
//!
//! Compiled for `cfg(test)` and behind the `testing` feature.

use crate::vendor::{OrderVendor, VendorError, VendorReceipt};
use async_trait::async_trait;
use rust_decimal::Decimal;
use satwik_sdk::objects::{CreateOrderRequest, OrderItem};
use std::sync::Mutex;

enum Reply {
    /// `SAL-ORD-2026-00001`, `SAL-ORD-2026-00002`, ...
    Sequential,
    /// The same Sales Order name for every order.
    Fixed(String),
    Reject(String),
}

/// Vendor double that records the internal ids it was asked to submit.
pub struct FakeVendor {
    reply: Reply,
    submitted: Mutex<Vec<String>>,
}

impl FakeVendor {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::new(Reply::Sequential)
    }

    /// Accepts every order under the same Sales Order name.
    pub fn fixed(accu360_order_id: &str) -> Self {
        Self::new(Reply::Fixed(accu360_order_id.to_string()))
    }

    /// Rejects every order with an API error carrying `detail`.
    pub fn rejecting(detail: &str) -> Self {
        Self::new(Reply::Reject(detail.to_string()))
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl OrderVendor for FakeVendor {
    async fn submit_order(
        &self,
        order_id: &str,
        _request: &CreateOrderRequest,
    ) -> Result<VendorReceipt, VendorError> {
        let count = {
            let mut submitted = self
                .submitted
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            submitted.push(order_id.to_string());
            submitted.len()
        };
        match &self.reply {
            Reply::Sequential => Ok(VendorReceipt {
                accu360_order_id: Some(format!("SAL-ORD-2026-{count:05}")),
            }),
            Reply::Fixed(name) => Ok(VendorReceipt {
                accu360_order_id: Some(name.clone()),
            }),
            Reply::Reject(detail) => Err(VendorError::Api {
                status: 417,
                detail: detail.clone(),
            }),
        }
    }
}

/// A valid two-tray egg order.
pub fn order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: "Asha Mrema".to_string(),
        customer_phone: "0712345678".to_string(),
        customer_address: "Plot 12, Mikocheni".to_string(),
        items: vec![OrderItem {
            product_id: "eggs-30".to_string(),
            accu360_sku: "EGG-TRAY-30".to_string(),
            name: "Egg tray (30)".to_string(),
            quantity: 2,
            unit_price: Decimal::new(12500, 0),
            total_price: Decimal::new(25000, 0),
        }],
        subtotal: Decimal::new(25000, 0),
        delivery_fee: Decimal::new(2000, 0),
        total: Decimal::new(27000, 0),
        delivery_notes: None,
    }
}
