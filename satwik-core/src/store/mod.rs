//! Persistence seams for orders and vendor credentials.
//!
//! Handlers and the submission workflow talk to these traits. PostgreSQL
//! backs them in production ([`crate::framework::DatabaseProcessor`]);
//! [`MemoryStore`] serves development runs and tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;

use crate::entities::order_records::{
    ApplyVendorStatus, InsertOrderRecord, MarkOrderFailed, MarkOrderSubmitted, OrderRecord,
};
use crate::entities::vendor_credentials::{UpsertVendorCredential, VendorCredential};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("order id already exists: {0}")]
    DuplicateOrderId(String),

    #[error("Accu360 order id already belongs to another order: {0}")]
    DuplicateVendorId(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order with status `created`.
    async fn insert_order(&self, insert: InsertOrderRecord) -> Result<OrderRecord, StoreError>;

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError>;

    async fn get_order_by_vendor_id(
        &self,
        accu360_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError>;

    async fn mark_submitted(
        &self,
        update: MarkOrderSubmitted,
    ) -> Result<Option<OrderRecord>, StoreError>;

    async fn mark_failed(&self, update: MarkOrderFailed)
    -> Result<Option<OrderRecord>, StoreError>;

    async fn apply_vendor_status(
        &self,
        update: ApplyVendorStatus,
    ) -> Result<Option<OrderRecord>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load_credential(&self, vendor: &str) -> Result<Option<VendorCredential>, StoreError>;

    async fn save_credential(
        &self,
        upsert: UpsertVendorCredential,
    ) -> Result<VendorCredential, StoreError>;
}
