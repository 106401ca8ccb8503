//! Coffee Box Storefront - subscription API and static catalog.
//!
//! This binary serves the subscription API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with JSON endpoints under `/api`
//! - `PostgreSQL` for customers and subscriptions
//! - Static catalog document under `/static/data/catalog.json`
//!
//! Migrations and catalog seeding are run explicitly via `cb-cli`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use coffee_box_core::Catalog;
use coffee_box_storefront::config::StorefrontConfig;
use coffee_box_storefront::state::AppState;
use coffee_box_storefront::{app, db};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start Sentry when `SENTRY_DSN` is set; the guard flushes events on drop.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// WARN and ERROR become Sentry events, INFO and DEBUG breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber: fmt output plus Sentry events for WARN and above.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coffee_box_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Check that the catalog the form loads is actually served.
fn check_catalog(config: &StorefrontConfig) {
    let path = config.catalog_path();
    match std::fs::read_to_string(&path).map(|body| Catalog::from_json(&body)) {
        Ok(Ok(catalog)) => tracing::info!(
            path = %path.display(),
            plans = catalog.plans.len(),
            brands = catalog.coffee_brands.len(),
            "Serving catalog"
        ),
        Ok(Err(e)) => tracing::warn!(path = %path.display(), error = %e, "Catalog is invalid"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Catalog not found"),
    }
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    tracing::debug!(database = ?config.database, "Configuration loaded");
    check_catalog(&config);

    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!("Subscription API listening on http://{addr}");

    axum::serve(listener, app(AppState::new(config, pool)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
