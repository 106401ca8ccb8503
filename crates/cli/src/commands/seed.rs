//! Mirror the catalog document into the database.
//!
//! Subscriptions reference plans and brands by foreign key, so the catalog
//! must be seeded before the first subscription is stored.

use std::path::Path;

use coffee_box_client::CatalogProvider;
use coffee_box_storefront::config::StorefrontConfig;
use coffee_box_storefront::db::{self, CatalogRepository};
use tracing::info;

/// Upsert plans, brands and grind options from `path`.
///
/// # Errors
///
/// Returns an error if the file is not a valid catalog, the configuration is
/// invalid or the database write fails.
pub async fn catalog(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Validate the document before connecting to the database
    info!(path = %path.display(), "Loading catalog");
    let catalog = CatalogProvider::load(path)?;

    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database).await?;

    let report = CatalogRepository::new(&pool).sync(&catalog).await?;
    info!(
        plans = report.plans,
        brands = report.brands,
        grind_options = report.grind_options,
        "Catalog seeded"
    );
    Ok(())
}
