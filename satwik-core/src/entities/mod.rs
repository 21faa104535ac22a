pub mod order_records;
pub mod vendor_credentials;

use time::{OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339};

/// Current UTC time as stored in `TIMESTAMP` columns.
pub fn utc_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Render a stored UTC timestamp as RFC 3339.
pub fn rfc3339(timestamp: PrimitiveDateTime) -> String {
    let timestamp = timestamp.assume_utc();
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.to_string())
}
