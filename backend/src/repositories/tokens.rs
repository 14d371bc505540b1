//! Token and customer repositories

use anyhow::Result;
use sqlx::PgPool;

/// Table an opaque API token is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTable {
    /// `api_auth`: admin (CRM) users
    Admin,
    /// `cust_api`: mobile app customers
    Customer,
}

impl TokenTable {
    pub fn table_name(self) -> &'static str {
        match self {
            TokenTable::Admin => "api_auth",
            TokenTable::Customer => "cust_api",
        }
    }

    fn select_user_id_sql(self) -> &'static str {
        match self {
            TokenTable::Admin => "SELECT user_id FROM api_auth WHERE token = $1 LIMIT 1",
            TokenTable::Customer => "SELECT user_id FROM cust_api WHERE token = $1 LIMIT 1",
        }
    }
}

/// Token repository for database operations
pub struct TokenRepository;

impl TokenRepository {
    /// Find the user id a token maps to in the given table
    pub async fn find_user_id(pool: &PgPool, table: TokenTable, token: &str) -> Result<Option<i64>> {
        let user_id = sqlx::query_scalar::<_, i64>(table.select_user_id_sql())
            .bind(token)
            .fetch_optional(pool)
            .await?;

        Ok(user_id)
    }

    /// Register a token for a user (used by tests and seeding)
    pub async fn insert(pool: &PgPool, table: TokenTable, token: &str, user_id: i64) -> Result<()> {
        let sql = match table {
            TokenTable::Admin => "INSERT INTO api_auth (token, user_id) VALUES ($1, $2)",
            TokenTable::Customer => "INSERT INTO cust_api (token, user_id) VALUES ($1, $2)",
        };

        sqlx::query(sql)
            .bind(token)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// Customer repository for database operations
pub struct CustomerRepository;

impl CustomerRepository {
    /// Stamp `updated_on` with the current time
    ///
    /// Returns the number of rows touched (0 when the customer row is missing).
    pub async fn touch_updated_on(pool: &PgPool, customer_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET updated_on = NOW()
            WHERE id = $1
            "#,
        )
        .bind(customer_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
