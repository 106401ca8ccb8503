//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `plans`, `coffee_brands`, `grind_options` - Catalog mirror (seeded from `catalog.json`)
//! - `customers` - One row per email
//! - `subscriptions` - Subscription header (plan + customer)
//! - `subscription_brands` - Brand/grind lines of a subscription
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p coffee-box-cli -- migrate
//! ```
//!
//! Queries are built at runtime with `sqlx::query` so the workspace compiles
//! without a live database.

pub mod catalog;
pub mod subscriptions;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use catalog::CatalogRepository;
pub use subscriptions::SubscriptionRepository;

/// Embedded storefront migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the settings are invalid or the connection
/// cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options()
        .connect_with(config.connect_options()?)
        .await
}

/// Create a pool that connects on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the settings are invalid.
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    Ok(pool_options().connect_lazy_with(config.connect_options()?))
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(10))
}
