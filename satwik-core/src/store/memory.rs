use super::{CredentialStore, OrderStore, StoreError};
use crate::entities::order_records::{
    ApplyVendorStatus, InsertOrderRecord, MarkOrderFailed, MarkOrderSubmitted, OrderRecord,
    OrderStatus,
};
use crate::entities::utc_now;
use crate::entities::vendor_credentials::{UpsertVendorCredential, VendorCredential};
use async_trait::async_trait;
use sqlx::types::Json;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process store with the same semantics as the PostgreSQL schema.
///
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<String, OrderRecord>>,
    credentials: RwLock<HashMap<String, VendorCredential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fill `record.accu360_order_id` if it is empty, enforcing uniqueness.
fn fill_vendor_id(
    orders: &HashMap<String, OrderRecord>,
    record: &mut OrderRecord,
    vendor_id: Option<&String>,
) -> Result<(), StoreError> {
    let Some(vendor_id) = vendor_id else {
        return Ok(());
    };
    if record.accu360_order_id.is_some() {
        return Ok(());
    }
    let taken = orders.values().any(|other| {
        other.order_id != record.order_id && other.accu360_order_id.as_ref() == Some(vendor_id)
    });
    if taken {
        return Err(StoreError::DuplicateVendorId(vendor_id.clone()));
    }
    record.accu360_order_id = Some(vendor_id.clone());
    Ok(())
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, insert: InsertOrderRecord) -> Result<OrderRecord, StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&insert.order_id) {
            return Err(StoreError::DuplicateOrderId(insert.order_id));
        }
        let now = utc_now();
        let record = OrderRecord {
            order_id: insert.order_id,
            accu360_order_id: None,
            status: OrderStatus::Created,
            vendor_status: None,
            failure_reason: None,
            customer_name: insert.customer_name,
            customer_phone: insert.customer_phone,
            customer_address: insert.customer_address,
            items: Json(insert.items),
            subtotal: insert.subtotal,
            delivery_fee: insert.delivery_fee,
            total: insert.total,
            delivery_notes: insert.delivery_notes,
            created_at: now,
            updated_at: now,
        };
        orders.insert(record.order_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn get_order_by_vendor_id(
        &self,
        accu360_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|r| r.accu360_order_id.as_deref() == Some(accu360_order_id))
            .cloned())
    }

    async fn mark_submitted(
        &self,
        update: MarkOrderSubmitted,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(mut record) = orders.get(&update.order_id).cloned() else {
            return Ok(None);
        };
        fill_vendor_id(&orders, &mut record, update.accu360_order_id.as_ref())?;
        record.status = OrderStatus::Submitted;
        record.failure_reason = None;
        record.updated_at = utc_now();
        orders.insert(record.order_id.clone(), record.clone());
        Ok(Some(record))
    }

    async fn mark_failed(
        &self,
        update: MarkOrderFailed,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(record) = orders.get_mut(&update.order_id) else {
            return Ok(None);
        };
        record.status = OrderStatus::Failed;
        record.failure_reason = Some(update.reason);
        record.updated_at = utc_now();
        Ok(Some(record.clone()))
    }

    async fn apply_vendor_status(
        &self,
        update: ApplyVendorStatus,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(mut record) = orders.get(&update.order_id).cloned() else {
            return Ok(None);
        };
        fill_vendor_id(&orders, &mut record, update.accu360_order_id.as_ref())?;
        record.status = update.status;
        record.vendor_status = Some(update.vendor_status);
        record.updated_at = utc_now();
        orders.insert(record.order_id.clone(), record.clone());
        Ok(Some(record))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load_credential(&self, vendor: &str) -> Result<Option<VendorCredential>, StoreError> {
        Ok(self.credentials.read().await.get(vendor).cloned())
    }

    async fn save_credential(
        &self,
        upsert: UpsertVendorCredential,
    ) -> Result<VendorCredential, StoreError> {
        let credential = VendorCredential {
            vendor: upsert.vendor,
            access_token: upsert.access_token,
            refresh_token: upsert.refresh_token,
            expires_at: upsert.expires_at,
            updated_at: utc_now(),
        };
        self.credentials
            .write()
            .await
            .insert(credential.vendor.clone(), credential.clone());
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn insert(order_id: &str) -> InsertOrderRecord {
        InsertOrderRecord {
            order_id: order_id.to_string(),
            customer_name: "Asha".to_string(),
            customer_phone: "0712345678".to_string(),
            customer_address: "Mikocheni".to_string(),
            items: vec![],
            subtotal: Decimal::new(1000, 0),
            delivery_fee: Decimal::ZERO,
            total: Decimal::new(1000, 0),
            delivery_notes: None,
        }
    }

    #[tokio::test]
    async fn duplicate_order_id_is_rejected() {
        let store = MemoryStore::new();
        store.insert_order(insert("SF-1")).await.unwrap();
        assert!(matches!(
            store.insert_order(insert("SF-1")).await,
            Err(StoreError::DuplicateOrderId(id)) if id == "SF-1"
        ));
    }

    #[tokio::test]
    async fn vendor_id_is_set_at_most_once() {
        let store = MemoryStore::new();
        store.insert_order(insert("SF-1")).await.unwrap();
        store
            .mark_submitted(MarkOrderSubmitted {
                order_id: "SF-1".to_string(),
                accu360_order_id: Some("SAL-ORD-1".to_string()),
            })
            .await
            .unwrap();
        let updated = store
            .apply_vendor_status(ApplyVendorStatus {
                order_id: "SF-1".to_string(),
                status: OrderStatus::Accepted,
                vendor_status: "To Deliver".to_string(),
                accu360_order_id: Some("SAL-ORD-2".to_string()),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.accu360_order_id.as_deref(), Some("SAL-ORD-1"));
        assert_eq!(updated.status, OrderStatus::Accepted);
        assert!(
            store
                .get_order_by_vendor_id("SAL-ORD-1")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn vendor_id_must_be_unique() {
        let store = MemoryStore::new();
        store.insert_order(insert("SF-1")).await.unwrap();
        store.insert_order(insert("SF-2")).await.unwrap();
        store
            .mark_submitted(MarkOrderSubmitted {
                order_id: "SF-1".to_string(),
                accu360_order_id: Some("SAL-ORD-1".to_string()),
            })
            .await
            .unwrap();
        let result = store
            .mark_submitted(MarkOrderSubmitted {
                order_id: "SF-2".to_string(),
                accu360_order_id: Some("SAL-ORD-1".to_string()),
            })
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateVendorId(_))));
        let untouched = store.get_order("SF-2").await.unwrap().unwrap();
        assert_eq!(untouched.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn updates_on_missing_order_return_none() {
        let store = MemoryStore::new();
        let result = store
            .mark_failed(MarkOrderFailed {
                order_id: "SF-404".to_string(),
                reason: "boom".to_string(),
            })
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
