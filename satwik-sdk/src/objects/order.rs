//! Order request and response bodies exchanged with the mobile app.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line of an order.
///
/// Money travels as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product identifier in the mobile app catalogue.
    pub product_id: String,
    /// Item code of the product in Accu360.
    pub accu360_sku: String,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// Request payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub delivery_notes: Option<String>,
}

/// Order status as exposed over the API.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `satwik-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Submitted,
    Accepted,
    Failed,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Submitted => write!(f, "submitted"),
            OrderStatus::Accepted => write!(f, "accepted"),
            OrderStatus::Failed => write!(f, "failed"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

/// Response of a successful `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub accu360_order_id: Option<String>,
    pub status: OrderStatus,
    pub message: String,
    /// RFC 3339 creation time.
    pub created_at: String,
}

/// Body returned with `502 Bad Gateway` when the vendor rejected an order.
///
/// The order is still recorded and can be fetched by `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFailedResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Response of `GET /orders/{order_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub accu360_order_id: Option<String>,
    pub status: OrderStatus,
    /// Raw status string last reported by Accu360.
    pub vendor_status: Option<String>,
    pub failure_reason: Option<String>,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub delivery_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_order_request_accepts_numeric_prices() {
        let json = r#"{
            "customer_name": "Asha",
            "customer_phone": "+255712345678",
            "customer_address": "Plot 4, Mikocheni",
            "items": [{
                "product_id": "p-1",
                "accu360_sku": "EGG-TRAY",
                "name": "Eggs (tray)",
                "quantity": 2,
                "unit_price": 12000,
                "total_price": 24000.50
            }],
            "subtotal": 24000.50,
            "delivery_fee": 3000,
            "total": 27000.50
        }"#;
        let request: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.total, Decimal::new(2700050, 2));
        assert!(request.delivery_notes.is_none());
    }

    #[test]
    fn money_serializes_as_numbers() {
        let item = OrderItem {
            product_id: "p-1".to_string(),
            accu360_sku: "EGG-TRAY".to_string(),
            name: "Eggs (tray)".to_string(),
            quantity: 1,
            unit_price: Decimal::new(1250, 2),
            total_price: Decimal::new(12000, 0),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["unit_price"], 12.5);
        assert_eq!(value["total_price"], 12000.0);

        let back: OrderItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
        assert_eq!(OrderStatus::Submitted.to_string(), "submitted");
    }
}
