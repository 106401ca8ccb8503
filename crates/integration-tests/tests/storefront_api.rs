//! The storefront router served in-process and driven over HTTP.
//!
//! None of these requests reach a database: the pool points at a closed
//! port. Readiness waits out the pool's acquire timeout and reports 503;
//! every other case is answered before a connection is acquired.

use reqwest::StatusCode;
use serde_json::{Value, json};

use coffee_box_client::{ApiClient, CatalogProvider, ClientError, Session, SubscriptionForm};
use coffee_box_integration_tests::{
    example_submission, spawn_storefront, unreachable_pool, unreachable_url,
};

async fn storefront() -> ApiClient {
    ApiClient::new(spawn_storefront(unreachable_pool()).await)
}

// ============================================================================
// Health & Ping
// ============================================================================

#[tokio::test]
async fn test_health() {
    let base = spawn_storefront(unreachable_pool()).await;
    let resp = reqwest::get(base.join("health").expect("Invalid URL"))
        .await
        .expect("Failed to call /health");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
async fn test_readiness_without_database() {
    let base = spawn_storefront(unreachable_pool()).await;
    let resp = reqwest::get(base.join("health/ready").expect("Invalid URL"))
        .await
        .expect("Failed to call /health/ready");

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ping() {
    let ping = storefront().await.ping().await.expect("Ping failed");
    assert!(ping.ok);
    assert_eq!(ping.message, "API Coffee Box OK");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_served_as_static_file() {
    let api = storefront().await;
    let session = Session::from_storefront(&CatalogProvider::default(), api.base_url())
        .await
        .expect("Failed to load catalog from storefront");

    let form = SubscriptionForm::new(&session);
    let labels: Vec<&str> = form.plan_options().iter().map(|o| o.label.as_str()).collect();
    assert_eq!(
        labels,
        ["Basic - $45.000", "Standard - $69.000", "Premium - $99.000"]
    );
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_customer_rejected() {
    let mut submission = example_submission("a@b.com");
    submission.customer = None;

    let err = storefront()
        .await
        .create_subscription(&submission)
        .await
        .expect_err("Submission without customer was accepted");

    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "incomplete data: customer is required");
        }
        other => panic!("Expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_brands_rejected() {
    let mut submission = example_submission("a@b.com");
    submission.brands.clear();

    let err = storefront()
        .await
        .create_subscription(&submission)
        .await
        .expect_err("Submission without brands was accepted");
    assert!(matches!(err, ClientError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let submission = example_submission("not-an-email");

    let err = storefront()
        .await
        .create_subscription(&submission)
        .await
        .expect_err("Submission with invalid email was accepted");
    assert!(matches!(err, ClientError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let base = spawn_storefront(unreachable_pool()).await;
    let resp = reqwest::Client::new()
        .post(base.join("api/suscripciones").expect("Invalid URL"))
        .header("content-type", "application/json")
        .body("{\"planId\": ")
        .send()
        .await
        .expect("Failed to post");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].is_string());
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_unreachable_storefront_is_network_error() {
    let api = ApiClient::new(unreachable_url());
    let err = api
        .create_subscription(&example_submission("a@b.com"))
        .await
        .expect_err("Request to closed port succeeded");
    assert!(err.is_network());
}
