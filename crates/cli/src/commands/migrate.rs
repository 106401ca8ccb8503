//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cb-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string, or
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` - its parts
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`

use coffee_box_storefront::config::StorefrontConfig;
use coffee_box_storefront::db::{self, MIGRATOR};
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] coffee_box_storefront::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns [`MigrationError`] if the database cannot be reached or a
/// migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&config.database).await?;

    tracing::info!("Running storefront migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
