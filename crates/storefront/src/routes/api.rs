//! Subscription API routes.
//!
//! JSON endpoints used by the subscription form. Responses always carry an
//! `ok` flag; failures are rendered by [`AppError`].

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::instrument;

use coffee_box_core::SubscriptionSubmission;
use coffee_box_core::api::{PingResponse, SubscriptionCreated, SubscriptionList};

use crate::db::SubscriptionRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Message returned by `GET /api/ping`.
pub const PING_MESSAGE: &str = "API Coffee Box OK";

/// Message returned when the listing query fails.
pub const LIST_FAILED_MESSAGE: &str = "Error listing subscriptions";

/// Confirmation message for a stored subscription.
pub const CREATED_MESSAGE: &str = "Subscription saved";

/// API liveness probe.
///
/// GET /api/ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        message: PING_MESSAGE.to_owned(),
    })
}

/// Create a subscription.
///
/// POST /api/suscripciones
///
/// The submission is validated before a connection is taken from the pool,
/// so incomplete payloads never reach the database.
///
/// # Errors
///
/// Returns 400 for malformed or incomplete submissions and 500 with the
/// underlying database message if persistence fails.
#[instrument(skip_all)]
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubscriptionSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionCreated>)> {
    let Json(submission) = payload?;
    let validated = submission.validate()?;

    let subscription_id = SubscriptionRepository::new(state.pool())
        .create(&validated)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreated {
            ok: true,
            subscription_id,
            message: CREATED_MESSAGE.to_owned(),
        }),
    ))
}

/// List subscriptions joined with plan and customer, newest first.
///
/// GET /api/suscripciones
///
/// # Errors
///
/// Returns 500 with a generic message if the query fails.
#[instrument(skip_all)]
pub async fn list_subscriptions(State(state): State<AppState>) -> Result<Json<SubscriptionList>> {
    let data = SubscriptionRepository::new(state.pool())
        .list()
        .await
        .map_err(|source| AppError::Concealed {
            message: LIST_FAILED_MESSAGE,
            source,
        })?;

    Ok(Json(SubscriptionList { ok: true, data }))
}
