use sqlx::PgPool;

/// Runs the SQL processors in [`crate::entities`] against a connection pool.
#[derive(Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
