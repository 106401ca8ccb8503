//! Subscription persistence against a real database.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `TEST_DATABASE_URL` pointing at it (migrations and catalog seeding run automatically)
//!
//! Run with: `cargo test -p coffee-box-integration-tests -- --ignored`

use sqlx::PgPool;

use coffee_box_client::{ApiClient, ClientError};
use coffee_box_core::{BrandSelection, SubscriptionSubmission};
use coffee_box_integration_tests::{
    customer, example_submission, shipped_catalog, spawn_storefront, test_pool, unique_email,
};
use coffee_box_storefront::db::{CatalogRepository, RepositoryError, SubscriptionRepository};

async fn customer_count(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("Failed to count customers")
}

async fn subscription_count(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        r"
        SELECT COUNT(*)
        FROM subscriptions s
        JOIN customers c ON s.customer_id = c.id
        WHERE c.email = $1
        ",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("Failed to count subscriptions")
}

async fn brand_lines(pool: &PgPool, subscription_id: i32) -> Vec<(String, String)> {
    sqlx::query_as(
        r"
        SELECT brand_id, grind_id
        FROM subscription_brands
        WHERE subscription_id = $1
        ORDER BY id
        ",
    )
    .bind(subscription_id)
    .fetch_all(pool)
    .await
    .expect("Failed to read brand lines")
}

// ============================================================================
// Transactional create
// ============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_new_email_creates_customer_header_and_lines() {
    let pool = test_pool().await;
    let email = unique_email("new");

    let submission = SubscriptionSubmission {
        plan_id: "premium".to_owned(),
        brands: vec![
            BrandSelection::new("brand_juan_valdez", "espresso"),
            BrandSelection::new("brand_oma", "moka"),
        ],
        customer: Some(customer(&email)),
    };
    let validated = submission.validate().expect("Submission is valid");

    let id = SubscriptionRepository::new(&pool)
        .create(&validated)
        .await
        .expect("Failed to create subscription");

    assert_eq!(customer_count(&pool, &email).await, 1);
    assert_eq!(subscription_count(&pool, &email).await, 1);
    assert_eq!(
        brand_lines(&pool, id.as_i32()).await,
        vec![
            ("brand_juan_valdez".to_owned(), "espresso".to_owned()),
            ("brand_oma".to_owned(), "moka".to_owned()),
        ]
    );
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_existing_email_updates_customer_in_place() {
    let pool = test_pool().await;
    let email = unique_email("existing");
    let repo = SubscriptionRepository::new(&pool);

    let first = example_submission(&email).validate().expect("valid");
    repo.create(&first).await.expect("First create failed");

    let mut second = example_submission(&email);
    if let Some(c) = second.customer.as_mut() {
        c.name = "Renamed".to_owned();
        c.address = "Carrera 7".to_owned();
    }
    let second = second.validate().expect("valid");
    repo.create(&second).await.expect("Second create failed");

    assert_eq!(customer_count(&pool, &email).await, 1);
    assert_eq!(subscription_count(&pool, &email).await, 2);

    let (name, address): (String, String) =
        sqlx::query_as("SELECT name, address FROM customers WHERE email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .expect("Customer missing");
    assert_eq!(name, "Renamed");
    assert_eq!(address, "Carrera 7");
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_failed_line_rolls_back_everything() {
    let pool = test_pool().await;
    let email = unique_email("rollback");

    // The unknown brand violates the foreign key after the customer and
    // header rows were written inside the transaction.
    let submission = SubscriptionSubmission {
        plan_id: "standard".to_owned(),
        brands: vec![
            BrandSelection::new("brand_juan_valdez", "espresso"),
            BrandSelection::new("brand_missing", "espresso"),
        ],
        customer: Some(customer(&email)),
    };
    let validated = submission.validate().expect("valid");

    let err = SubscriptionRepository::new(&pool)
        .create(&validated)
        .await
        .expect_err("Unknown brand was accepted");
    assert!(matches!(err, RepositoryError::Database(_)));

    assert_eq!(customer_count(&pool, &email).await, 0);
    assert_eq!(subscription_count(&pool, &email).await, 0);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_grind_is_not_checked_against_brand() {
    let pool = test_pool().await;
    let email = unique_email("grind");

    let submission = SubscriptionSubmission::single(
        "basic",
        BrandSelection::new("brand_sello_rojo", "espresso"),
        customer(&email),
    );
    let validated = submission.validate().expect("valid");

    SubscriptionRepository::new(&pool)
        .create(&validated)
        .await
        .expect("Grind outside the brand's options was rejected");
    assert_eq!(subscription_count(&pool, &email).await, 1);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_list_is_newest_first() {
    let pool = test_pool().await;
    let email = unique_email("order");
    let repo = SubscriptionRepository::new(&pool);

    let validated = example_submission(&email).validate().expect("valid");
    let older = repo.create(&validated).await.expect("create failed");
    let newer = repo.create(&validated).await.expect("create failed");

    let ids: Vec<_> = repo
        .list()
        .await
        .expect("List failed")
        .into_iter()
        .filter(|s| s.email == email)
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![newer, older]);
}

// ============================================================================
// Over HTTP
// ============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_example_submission_end_to_end() {
    let pool = test_pool().await;
    let api = ApiClient::new(spawn_storefront(pool).await);

    let id = api
        .create_subscription(&example_submission("a@b.com"))
        .await
        .expect("Example submission failed");
    assert!(id.as_i32() > 0);

    let listed = api.list_subscriptions().await.expect("List failed");
    let row = listed
        .iter()
        .find(|s| s.id == id)
        .expect("New subscription missing from list");
    assert_eq!(row.plan, "Standard");
    assert_eq!(row.email, "a@b.com");
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_unknown_plan_is_server_error_with_message() {
    let pool = test_pool().await;
    let api = ApiClient::new(spawn_storefront(pool.clone()).await);
    let email = unique_email("plan");

    let mut submission = example_submission(&email);
    submission.plan_id = "gold".to_owned();

    let err = api
        .create_subscription(&submission)
        .await
        .expect_err("Unknown plan was accepted");
    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("foreign key"), "unexpected message: {message}");
        }
        other => panic!("Expected rejection, got {other:?}"),
    }
    assert_eq!(customer_count(&pool, &email).await, 0);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_readiness_with_database() {
    let pool = test_pool().await;
    let base = spawn_storefront(pool).await;

    let resp = reqwest::get(base.join("health/ready").expect("Invalid URL"))
        .await
        .expect("Failed to call readiness");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

// ============================================================================
// Catalog mirror
// ============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_catalog_sync_is_idempotent() {
    let pool = test_pool().await;
    let repo = CatalogRepository::new(&pool);

    let report = repo
        .sync(&shipped_catalog())
        .await
        .expect("Second sync failed");
    assert_eq!(report.plans, 3);
    assert_eq!(report.brands, 3);
    assert_eq!(report.grind_options, 9);

    let name = repo.plan_name("standard").await.expect("Query failed");
    assert_eq!(name.as_deref(), Some("Standard"));
}
