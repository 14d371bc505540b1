//! Storage seam for the request guards
//!
//! Guards never talk to the pool directly; they go through [`AuthStore`]
//! so a request can be authenticated against PostgreSQL in production and
//! against an in-memory table in tests.

use crate::repositories::{CustomerRepository, TokenRepository, TokenTable};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Look up the user id a token maps to. `Ok(None)` means no row.
    async fn find_user_id(&self, table: TokenTable, token: &str) -> Result<Option<i64>>;

    /// Stamp the customer's `updated_on` with the current time
    async fn touch_customer(&self, customer_id: i64) -> Result<()>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_user_id(&self, table: TokenTable, token: &str) -> Result<Option<i64>> {
        TokenRepository::find_user_id(&self.pool, table, token).await
    }

    async fn touch_customer(&self, customer_id: i64) -> Result<()> {
        CustomerRepository::touch_updated_on(&self.pool, customer_id).await?;
        Ok(())
    }
}
