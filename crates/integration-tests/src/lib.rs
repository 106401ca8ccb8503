//! Integration tests for Coffee Box.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP tests (no database needed)
//! cargo test -p coffee-box-integration-tests
//!
//! # Database tests
//! TEST_DATABASE_URL=postgres://postgres@localhost/coffee_box_test \
//!     cargo test -p coffee-box-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - The storefront router served in-process, driven by the client crate
//! - `subscriptions_db` - Transactional persistence against a real `PostgreSQL`
//!
//! Database tests migrate the database and seed the shipped catalog before
//! running. Every test uses its own email address so tests can run in
//! parallel against one database.

use std::path::PathBuf;

use sqlx::PgPool;
use url::Url;

use coffee_box_core::{BrandSelection, Catalog, CustomerDetails, SubscriptionSubmission};
use coffee_box_storefront::config::StorefrontConfig;
use coffee_box_storefront::db::{self, CatalogRepository, MIGRATOR};
use coffee_box_storefront::state::AppState;

/// Environment variable naming the test database.
pub const TEST_DATABASE_ENV: &str = "TEST_DATABASE_URL";

/// Connection string for a database that is never reachable.
const UNREACHABLE_DATABASE_URL: &str = "postgres://coffee@127.0.0.1:9/coffee_box";

/// Directory served under `/static` by test servers.
#[must_use]
pub fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static")
}

/// The catalog shipped with the storefront.
///
/// # Panics
///
/// Panics if the shipped catalog is invalid.
#[must_use]
pub fn shipped_catalog() -> Catalog {
    let path = static_dir().join("data").join("catalog.json");
    let body = std::fs::read_to_string(path).expect("Failed to read shipped catalog");
    Catalog::from_json(&body).expect("Shipped catalog is invalid")
}

/// Storefront configuration for tests: defaults plus the given database URL.
///
/// # Panics
///
/// Panics if the configuration cannot be built.
#[must_use]
pub fn test_config(database_url: &str) -> StorefrontConfig {
    let static_dir = static_dir().display().to_string();
    StorefrontConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.to_owned()),
        "STATIC_DIR" => Some(static_dir.clone()),
        _ => None,
    })
    .expect("Failed to build test configuration")
}

/// A pool pointing at a closed port; any query fails with a connection error.
///
/// # Panics
///
/// Panics if the pool cannot be configured.
#[must_use]
pub fn unreachable_pool() -> PgPool {
    let config = test_config(UNREACHABLE_DATABASE_URL);
    db::create_lazy_pool(&config.database).expect("Failed to configure lazy pool")
}

/// Connect to `TEST_DATABASE_URL`, run migrations and seed the catalog.
///
/// # Panics
///
/// Panics if the variable is unset or the database cannot be prepared.
pub async fn test_pool() -> PgPool {
    let url = std::env::var(TEST_DATABASE_ENV)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_ENV} must be set for database tests"));
    let config = test_config(&url);

    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to connect to test database");
    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    CatalogRepository::new(&pool)
        .sync(&shipped_catalog())
        .await
        .expect("Failed to seed catalog");
    pool
}

/// Serve the storefront application on an ephemeral port.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_storefront(pool: PgPool) -> Url {
    let state = AppState::new(test_config(UNREACHABLE_DATABASE_URL), pool);
    let app = coffee_box_storefront::app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Url::parse(&format!("http://{addr}/")).expect("Invalid test URL")
}

/// A base URL on which nothing is listening.
///
/// # Panics
///
/// Panics if no local port can be probed.
#[must_use]
pub fn unreachable_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe");
    let addr = listener.local_addr().expect("Failed to read probe address");
    drop(listener);
    Url::parse(&format!("http://{addr}/")).expect("Invalid test URL")
}

/// An email address no other test uses.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}+{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Customer details with the given email.
#[must_use]
pub fn customer(email: &str) -> CustomerDetails {
    CustomerDetails {
        name: "A".to_owned(),
        lastname: "B".to_owned(),
        email: email.to_owned(),
        phone: "1".to_owned(),
        address: "x".to_owned(),
    }
}

/// The canonical example: `standard` plan, Juan Valdez espresso.
#[must_use]
pub fn example_submission(email: &str) -> SubscriptionSubmission {
    SubscriptionSubmission::single(
        "standard",
        BrandSelection::new("brand_juan_valdez", "espresso"),
        customer(email),
    )
}
