//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /orders`                  – submit an order from the mobile app
//! - `GET  /orders/{order_id}`       – fetch a stored order
//! - `POST /webhooks/accu360`        – status updates from Accu360
//! - `GET  /auth/accu360/initiate`   – start the OAuth2 authorization flow
//! - `GET  /auth/accu360/callback`   – finish it and store the credential

use axum::Router;

use crate::state::AppState;

mod extractors;
mod oauth;
mod orders;
mod webhooks;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(orders::router())
        .merge(webhooks::router())
        .merge(oauth::router())
}
