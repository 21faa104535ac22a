pub mod auth;
pub mod health;
pub mod order;
pub mod webhook;

pub use auth::OAuthConnected;
pub use health::{HealthResponse, ReadyResponse};
pub use order::{
    CreateOrderRequest, CreateOrderResponse, CustomerInfo, OrderFailedResponse, OrderItem,
    OrderResponse, OrderStatus,
};
pub use webhook::{Accu360WebhookPayload, WebhookAck};
