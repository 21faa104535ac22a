//! OAuth credentials for outbound vendor calls.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Vendor key of the Accu360 credential row.
pub const ACCU360: &str = "accu360";

#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VendorCredential {
    pub vendor: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// UTC expiry of `access_token`.
    pub expires_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl VendorCredential {
    /// Whether the access token expires within `margin` of `now`.
    pub fn expires_within(&self, now: OffsetDateTime, margin: Duration) -> bool {
        self.expires_at.assume_utc() - now <= margin
    }
}

impl std::fmt::Debug for VendorCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorCredential")
            .field("vendor", &self.vendor)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[derive(Clone)]
pub struct GetVendorCredential {
    pub vendor: String,
}

impl Processor<GetVendorCredential> for DatabaseProcessor {
    type Output = Option<VendorCredential>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetVendorCredential")]
    async fn process(
        &self,
        query: GetVendorCredential,
    ) -> Result<Option<VendorCredential>, sqlx::Error> {
        sqlx::query_as::<_, VendorCredential>(
            "SELECT * FROM vendor_credentials WHERE vendor = $1",
        )
        .bind(&query.vendor)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Clone)]
/// Store the credential for a vendor, replacing any existing one.
pub struct UpsertVendorCredential {
    pub vendor: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: PrimitiveDateTime,
}

impl Processor<UpsertVendorCredential> for DatabaseProcessor {
    type Output = VendorCredential;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertVendorCredential")]
    async fn process(
        &self,
        upsert: UpsertVendorCredential,
    ) -> Result<VendorCredential, sqlx::Error> {
        sqlx::query_as::<_, VendorCredential>(
            r#"
            INSERT INTO vendor_credentials (vendor, access_token, refresh_token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (vendor) DO UPDATE
            SET access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at,
                updated_at = (now() AT TIME ZONE 'utc')
            RETURNING *
            "#,
        )
        .bind(&upsert.vendor)
        .bind(&upsert.access_token)
        .bind(&upsert.refresh_token)
        .bind(upsert.expires_at)
        .fetch_one(&self.pool)
        .await
    }
}
