//! Subscription repository.
//!
//! [`SubscriptionRepository::create`] is the only multi-statement write in the
//! storefront. It runs on a single pooled connection inside one transaction:
//!
//! 1. find the customer by email, updating their details in place, or insert them
//! 2. insert the subscription header
//! 3. insert one `subscription_brands` row per brand line
//!
//! Any failure rolls the whole transaction back, so a customer row created
//! for a submission that later fails is never committed.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use coffee_box_core::api::SubscriptionSummary;
use coffee_box_core::{
    BrandLineId, BrandSelection, CustomerId, SubscriptionId, ValidatedCustomer,
    ValidatedSubmission,
};

use super::RepositoryError;

/// Repository for subscription database operations.
pub struct SubscriptionRepository<'a> {
    pool: &'a PgPool,
}

/// Outcome of the customer lookup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerUpsert {
    pub id: CustomerId,
    /// `true` if no customer with the email existed.
    pub created: bool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a validated submission atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if acquiring the connection or any
    /// statement fails. Nothing is committed in that case.
    #[instrument(
        skip_all,
        fields(plan_id = %submission.plan_id(), brand_lines = submission.brands().len())
    )]
    pub async fn create(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<SubscriptionId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        match persist(&mut tx, submission).await {
            Ok(subscription_id) => {
                tx.commit().await?;
                tracing::info!(%subscription_id, "Subscription committed");
                Ok(subscription_id)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        error = %rollback_err,
                        "Rollback failed; connection will be discarded"
                    );
                }
                tracing::warn!(error = %e, "Subscription rolled back");
                Err(e)
            }
        }
    }

    /// List all subscriptions with their plan name and customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<SubscriptionSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriptionSummary>(
            r"
            SELECT
                s.id,
                s.created_at,
                p.name     AS plan,
                c.name     AS customer_name,
                c.lastname AS customer_lastname,
                c.email
            FROM subscriptions s
            JOIN plans p     ON s.plan_id = p.id
            JOIN customers c ON s.customer_id = c.id
            ORDER BY s.created_at DESC, s.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

async fn persist(
    conn: &mut PgConnection,
    submission: &ValidatedSubmission,
) -> Result<SubscriptionId, RepositoryError> {
    let customer = upsert_customer(conn, submission.customer()).await?;
    tracing::debug!(customer_id = %customer.id, created = customer.created, "Customer resolved");

    let subscription_id = insert_subscription(conn, submission.plan_id(), customer.id).await?;

    for line in submission.brands() {
        let line_id = insert_brand_line(conn, subscription_id, line).await?;
        tracing::debug!(
            %line_id,
            brand_id = %line.brand_id,
            grind_id = %line.grind_id,
            "Brand line inserted"
        );
    }

    Ok(subscription_id)
}

/// Find a customer by email and refresh their details, or insert a new one.
async fn upsert_customer(
    conn: &mut PgConnection,
    customer: &ValidatedCustomer,
) -> Result<CustomerUpsert, RepositoryError> {
    let existing = sqlx::query_scalar::<_, CustomerId>("SELECT id FROM customers WHERE email = $1")
        .bind(&customer.email)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        sqlx::query(
            r"
            UPDATE customers
            SET name = $1, lastname = $2, phone = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            ",
        )
        .bind(&customer.name)
        .bind(&customer.lastname)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        return Ok(CustomerUpsert { id, created: false });
    }

    let id = sqlx::query_scalar::<_, CustomerId>(
        r"
        INSERT INTO customers (name, lastname, email, phone, address)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(&customer.name)
    .bind(&customer.lastname)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .fetch_one(&mut *conn)
    .await?;

    Ok(CustomerUpsert { id, created: true })
}

async fn insert_subscription(
    conn: &mut PgConnection,
    plan_id: &str,
    customer_id: CustomerId,
) -> Result<SubscriptionId, RepositoryError> {
    let id = sqlx::query_scalar::<_, SubscriptionId>(
        r"
        INSERT INTO subscriptions (plan_id, customer_id)
        VALUES ($1, $2)
        RETURNING id
        ",
    )
    .bind(plan_id)
    .bind(customer_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

async fn insert_brand_line(
    conn: &mut PgConnection,
    subscription_id: SubscriptionId,
    line: &BrandSelection,
) -> Result<BrandLineId, RepositoryError> {
    let id = sqlx::query_scalar::<_, BrandLineId>(
        r"
        INSERT INTO subscription_brands (subscription_id, brand_id, grind_id)
        VALUES ($1, $2, $3)
        RETURNING id
        ",
    )
    .bind(subscription_id)
    .bind(&line.brand_id)
    .bind(&line.grind_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}
