//! Catalog mirror in the database.
//!
//! The catalog document is the source of truth. The `plans`, `coffee_brands`
//! and `grind_options` tables mirror it so that subscriptions can reference
//! plans and brands by foreign key and the listing can show plan names.

use sqlx::PgPool;
use sqlx::types::Json;

use coffee_box_core::Catalog;

use super::RepositoryError;

/// Repository for catalog tables.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

/// Row counts written by [`CatalogRepository::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSyncReport {
    pub plans: usize,
    pub brands: usize,
    pub grind_options: usize,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert every plan, brand and grind option of `catalog` in one transaction.
    ///
    /// Rows that are no longer in the catalog are left in place because
    /// existing subscriptions may still reference them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    pub async fn sync(&self, catalog: &Catalog) -> Result<CatalogSyncReport, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut report = CatalogSyncReport::default();

        for plan in &catalog.plans {
            sqlx::query(
                r"
                INSERT INTO plans (id, name, price_monthly, features)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    price_monthly = EXCLUDED.price_monthly,
                    features = EXCLUDED.features
                ",
            )
            .bind(&plan.id)
            .bind(&plan.name)
            .bind(plan.price_monthly)
            .bind(Json(&plan.features))
            .execute(&mut *tx)
            .await?;
            report.plans += 1;
        }

        for brand in &catalog.coffee_brands {
            sqlx::query(
                r"
                INSERT INTO coffee_brands (id, name, origin)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, origin = EXCLUDED.origin
                ",
            )
            .bind(&brand.id)
            .bind(&brand.name)
            .bind(&brand.origin)
            .execute(&mut *tx)
            .await?;
            report.brands += 1;

            for grind in &brand.grind_options {
                sqlx::query(
                    r"
                    INSERT INTO grind_options (brand_id, id, label)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (brand_id, id) DO UPDATE
                    SET label = EXCLUDED.label
                    ",
                )
                .bind(&brand.id)
                .bind(&grind.id)
                .bind(&grind.label)
                .execute(&mut *tx)
                .await?;
                report.grind_options += 1;
            }
        }

        tx.commit().await?;
        tracing::info!(
            plans = report.plans,
            brands = report.brands,
            grind_options = report.grind_options,
            "Catalog synced"
        );

        Ok(report)
    }

    /// Display name of a plan, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn plan_name(&self, plan_id: &str) -> Result<Option<String>, RepositoryError> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM plans WHERE id = $1")
            .bind(plan_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(name)
    }
}
