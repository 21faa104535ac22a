use super::{CredentialStore, OrderStore, StoreError};
use crate::entities::order_records::{
    ApplyVendorStatus, GetOrderRecordById, GetOrderRecordByVendorId, InsertOrderRecord,
    MarkOrderFailed, MarkOrderSubmitted, OrderRecord, PingDatabase,
};
use crate::entities::vendor_credentials::{
    GetVendorCredential, UpsertVendorCredential, VendorCredential,
};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;

const ORDERS_PKEY: &str = "orders_pkey";
const ORDERS_VENDOR_ID_KEY: &str = "orders_accu360_order_id_key";

/// Translate unique violations on `orders` into typed errors.
fn map_order_error(error: sqlx::Error, order_id: &str, vendor_id: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            match db_error.constraint() {
                Some(ORDERS_PKEY) => return StoreError::DuplicateOrderId(order_id.to_owned()),
                Some(ORDERS_VENDOR_ID_KEY) => {
                    return StoreError::DuplicateVendorId(vendor_id.unwrap_or_default().to_owned());
                }
                _ => {}
            }
        }
    }
    StoreError::Database(error)
}

#[async_trait]
impl OrderStore for DatabaseProcessor {
    async fn insert_order(&self, insert: InsertOrderRecord) -> Result<OrderRecord, StoreError> {
        let order_id = insert.order_id.clone();
        self.process(insert)
            .await
            .map_err(|e| map_order_error(e, &order_id, None))
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self
            .process(GetOrderRecordById {
                order_id: order_id.to_owned(),
            })
            .await?)
    }

    async fn get_order_by_vendor_id(
        &self,
        accu360_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self
            .process(GetOrderRecordByVendorId {
                accu360_order_id: accu360_order_id.to_owned(),
            })
            .await?)
    }

    async fn mark_submitted(
        &self,
        update: MarkOrderSubmitted,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let order_id = update.order_id.clone();
        let vendor_id = update.accu360_order_id.clone();
        self.process(update)
            .await
            .map_err(|e| map_order_error(e, &order_id, vendor_id.as_deref()))
    }

    async fn mark_failed(
        &self,
        update: MarkOrderFailed,
    ) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.process(update).await?)
    }

    async fn apply_vendor_status(
        &self,
        update: ApplyVendorStatus,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let order_id = update.order_id.clone();
        let vendor_id = update.accu360_order_id.clone();
        self.process(update)
            .await
            .map_err(|e| map_order_error(e, &order_id, vendor_id.as_deref()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.process(PingDatabase).await?)
    }
}

#[async_trait]
impl CredentialStore for DatabaseProcessor {
    async fn load_credential(&self, vendor: &str) -> Result<Option<VendorCredential>, StoreError> {
        Ok(self
            .process(GetVendorCredential {
                vendor: vendor.to_owned(),
            })
            .await?)
    }

    async fn save_credential(
        &self,
        upsert: UpsertVendorCredential,
    ) -> Result<VendorCredential, StoreError> {
        Ok(self.process(upsert).await?)
    }
}
