use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rand::Rng;
use rust_decimal::Decimal;
use satwik_sdk::objects::{OrderItem, OrderStatus as SdkOrderStatus};
use sqlx::types::Json;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRecord {
    pub order_id: String,
    pub accu360_order_id: Option<String>,
    pub status: OrderStatus,
    pub vendor_status: Option<String>,
    pub failure_reason: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Json<Vec<OrderItem>>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub delivery_notes: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// Order status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `satwik_sdk::objects::OrderStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "order_status")]
pub enum OrderStatus {
    Created,
    Submitted,
    Accepted,
    Failed,
    Delivered,
}

impl OrderStatus {
    /// Normalize a status reported by Accu360.
    ///
    /// Accepts the gateway's own status names as well as Frappe sales
    /// order statuses, case-insensitively.
    pub fn from_vendor_status(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "created" => Some(Self::Created),
            "submitted" | "pending" | "draft" => Some(Self::Submitted),
            "accepted" | "to deliver and bill" | "to deliver" | "to bill" | "on hold" => {
                Some(Self::Accepted)
            }
            "delivered" | "completed" | "closed" => Some(Self::Delivered),
            "failed" | "cancelled" | "canceled" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl From<OrderStatus> for SdkOrderStatus {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Created => SdkOrderStatus::Created,
            OrderStatus::Submitted => SdkOrderStatus::Submitted,
            OrderStatus::Accepted => SdkOrderStatus::Accepted,
            OrderStatus::Failed => SdkOrderStatus::Failed,
            OrderStatus::Delivered => SdkOrderStatus::Delivered,
        }
    }
}

impl From<SdkOrderStatus> for OrderStatus {
    fn from(value: SdkOrderStatus) -> Self {
        match value {
            SdkOrderStatus::Created => OrderStatus::Created,
            SdkOrderStatus::Submitted => OrderStatus::Submitted,
            SdkOrderStatus::Accepted => OrderStatus::Accepted,
            SdkOrderStatus::Failed => OrderStatus::Failed,
            SdkOrderStatus::Delivered => OrderStatus::Delivered,
        }
    }
}

/// Generate an internal order id of the form `SF-YYYYMMDD-NNNNN`.
pub fn generate_order_id(now: OffsetDateTime) -> String {
    let suffix: u32 = rand::rng().random_range(10000..=99999);
    format!(
        "SF-{:04}{:02}{:02}-{suffix}",
        now.year(),
        u8::from(now.month()),
        now.day()
    )
}

#[derive(Debug, Clone)]
/// Insert a new order with status `created`.
///
/// Fails with a unique violation if `order_id` is taken.
pub struct InsertOrderRecord {
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub delivery_notes: Option<String>,
}

impl Processor<InsertOrderRecord> for DatabaseProcessor {
    type Output = OrderRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertOrderRecord")]
    async fn process(&self, insert: InsertOrderRecord) -> Result<OrderRecord, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(
            r#"
            INSERT INTO orders (
                order_id, status, customer_name, customer_phone, customer_address,
                items, subtotal, delivery_fee, total, delivery_notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&insert.order_id)
        .bind(OrderStatus::Created)
        .bind(&insert.customer_name)
        .bind(&insert.customer_phone)
        .bind(&insert.customer_address)
        .bind(Json(&insert.items))
        .bind(insert.subtotal)
        .bind(insert.delivery_fee)
        .bind(insert.total)
        .bind(&insert.delivery_notes)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetOrderRecordById {
    pub order_id: String,
}

impl Processor<GetOrderRecordById> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrderRecordById")]
    async fn process(&self, query: GetOrderRecordById) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders WHERE order_id = $1")
            .bind(&query.order_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct GetOrderRecordByVendorId {
    pub accu360_order_id: String,
}

impl Processor<GetOrderRecordByVendorId> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrderRecordByVendorId")]
    async fn process(
        &self,
        query: GetOrderRecordByVendorId,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders WHERE accu360_order_id = $1")
            .bind(&query.accu360_order_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Record that Accu360 accepted the submission.
///
/// The vendor id is only written if none is stored yet.
pub struct MarkOrderSubmitted {
    pub order_id: String,
    pub accu360_order_id: Option<String>,
}

impl Processor<MarkOrderSubmitted> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkOrderSubmitted")]
    async fn process(&self, update: MarkOrderSubmitted) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders
            SET status = $2,
                accu360_order_id = COALESCE(accu360_order_id, $3),
                failure_reason = NULL,
                updated_at = (now() AT TIME ZONE 'utc')
            WHERE order_id = $1
            RETURNING *
            "#,
        )
        .bind(&update.order_id)
        .bind(OrderStatus::Submitted)
        .bind(&update.accu360_order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Record that the submission to Accu360 failed.
pub struct MarkOrderFailed {
    pub order_id: String,
    pub reason: String,
}

impl Processor<MarkOrderFailed> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkOrderFailed")]
    async fn process(&self, update: MarkOrderFailed) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders
            SET status = $2,
                failure_reason = $3,
                updated_at = (now() AT TIME ZONE 'utc')
            WHERE order_id = $1
            RETURNING *
            "#,
        )
        .bind(&update.order_id)
        .bind(OrderStatus::Failed)
        .bind(&update.reason)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Apply a status reported by an Accu360 webhook.
///
/// `accu360_order_id` fills the vendor id only when none is stored yet.
pub struct ApplyVendorStatus {
    pub order_id: String,
    pub status: OrderStatus,
    pub vendor_status: String,
    pub accu360_order_id: Option<String>,
}

impl Processor<ApplyVendorStatus> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ApplyVendorStatus")]
    async fn process(&self, update: ApplyVendorStatus) -> Result<Option<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders
            SET status = $2,
                vendor_status = $3,
                accu360_order_id = COALESCE(accu360_order_id, $4),
                updated_at = (now() AT TIME ZONE 'utc')
            WHERE order_id = $1
            RETURNING *
            "#,
        )
        .bind(&update.order_id)
        .bind(update.status)
        .bind(&update.vendor_status)
        .bind(&update.accu360_order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
/// Check that the database answers.
pub struct PingDatabase;

impl Processor<PingDatabase> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    async fn process(&self, _: PingDatabase) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
