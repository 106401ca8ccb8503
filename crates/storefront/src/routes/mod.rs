//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Subscription API
//! GET  /api/ping               - API liveness probe
//! POST /api/suscripciones      - Create a subscription
//! GET  /api/suscripciones      - List subscriptions, newest first
//!
//! # Static files
//! GET  /static/data/catalog.json - Catalog document
//! ```

pub mod api;
pub mod health;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the subscription API router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/ping", get(api::ping)).route(
        "/suscripciones",
        get(api::list_subscriptions).post(api::create_subscription),
    )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}
