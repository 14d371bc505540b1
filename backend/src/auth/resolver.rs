//! Token resolver
//!
//! Translates an opaque API token into a user id. A missing row and a
//! failed query both resolve to `0`, the "unauthenticated" id; only the
//! log line tells them apart.

use super::store::AuthStore;
use crate::repositories::TokenTable;
use std::sync::Arc;
use tracing::{debug, warn};

/// Id returned for any token that does not resolve to a user
pub const UNAUTHENTICATED: i64 = 0;

#[derive(Clone)]
pub struct TokenResolver {
    store: Arc<dyn AuthStore>,
}

impl TokenResolver {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// Resolve a CRM admin token from `api_auth`
    pub async fn resolve_admin_id(&self, token: &str) -> i64 {
        self.resolve(TokenTable::Admin, token).await
    }

    /// Resolve a mobile customer token from `cust_api`
    pub async fn resolve_customer_id(&self, token: &str) -> i64 {
        self.resolve(TokenTable::Customer, token).await
    }

    async fn resolve(&self, table: TokenTable, token: &str) -> i64 {
        match self.store.find_user_id(table, token).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                debug!(table = table.table_name(), "No user for token");
                UNAUTHENTICATED
            }
            Err(e) => {
                warn!(table = table.table_name(), error = %e, "Token lookup failed");
                UNAUTHENTICATED
            }
        }
    }

    /// Record that the customer was just seen
    pub async fn touch_customer(&self, customer_id: i64) -> anyhow::Result<()> {
        self.store.touch_customer(customer_id).await
    }
}
