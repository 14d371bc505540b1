//! Application state management
//!
//! Shared resources handed to every handler and guard through Axum's
//! state extraction. Everything here is built once at startup and is
//! cheap to clone.

use crate::auth::{AdminJwtValidator, AuthStore, PgAuthStore, TokenResolver};
use crate::config::AppConfig;
use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    resolver: TokenResolver,
    admin_jwt: AdminJwtValidator,
}

impl AppState {
    /// Create state backed by PostgreSQL token tables
    pub fn new(db: PgPool, config: AppConfig) -> Result<Self> {
        let store = Arc::new(PgAuthStore::new(db.clone()));
        Self::with_store(db, config, store)
    }

    /// Create state with a caller-supplied token store
    pub fn with_store(db: PgPool, config: AppConfig, store: Arc<dyn AuthStore>) -> Result<Self> {
        let admin_jwt = AdminJwtValidator::from_config(&config.auth.admin_jwt)?;

        Ok(Self {
            db,
            config: Arc::new(config),
            resolver: TokenResolver::new(store),
            admin_jwt,
        })
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    #[inline]
    pub fn admin_jwt(&self) -> &AdminJwtValidator {
        &self.admin_jwt
    }
}
