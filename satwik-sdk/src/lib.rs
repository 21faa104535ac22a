//! Shared types for the Satwik Farms order gateway.
//!
//! - [`objects`]: request, response and webhook bodies.
//! - [`signature`]: HMAC-SHA256 helpers for vendor webhooks and OAuth state.
//! - `client` (feature `client`): typed HTTP client for the gateway API.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
