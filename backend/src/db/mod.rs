//! Database pool management
//!
//! The guards issue one or two short queries per request, so the pool
//! keeps a small warm floor and recycles connections aggressively.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const MIN_CONNECTIONS: u32 = 1;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

fn connect_options(url: &str) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(url)
        .context("Invalid database URL")?
        .application_name("api-guard");
    Ok(options)
}

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(MIN_CONNECTIONS.min(max_connections))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .test_before_acquire(true)
}

/// Create the connection pool and open the first connection
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = pool_options(config.max_connections)
        .connect_with(connect_options(&config.url)?)
        .await
        .context("Failed to connect to database")?;

    info!(max = config.max_connections, "Database pool created");
    Ok(pool)
}

/// Create the pool without connecting; connections open on first use
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool> {
    Ok(pool_options(config.max_connections).connect_lazy_with(connect_options(&config.url)?))
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health, returning the round-trip time
pub async fn health_check(pool: &PgPool) -> Result<Duration> {
    let started = Instant::now();
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => Ok(started.elapsed()),
        Err(e) => {
            warn!("Database health check failed: {}", e);
            Err(e.into())
        }
    }
}
