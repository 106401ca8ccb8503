//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the API as `{"ok": false, "error": "..."}`. Server
//! errors are captured to Sentry and logged before responding.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use coffee_box_core::SubmissionError;
use coffee_box_core::api::ErrorResponse;

use crate::db::RepositoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// The submission is missing required data. Nothing was persisted.
    #[error(transparent)]
    Validation(#[from] SubmissionError),

    /// The request body could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A database operation failed; any open transaction was rolled back.
    #[error(transparent)]
    Database(#[from] RepositoryError),

    /// A database operation failed; the client only sees `message`.
    #[error("{message}")]
    Concealed {
        message: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// Internal server error with a client-safe message.
    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Concealed { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            let cause = std::error::Error::source(&self).map(ToString::to_string);
            tracing::error!(
                error = %self,
                cause = ?cause,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::info!(error = %self, "Request rejected");
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
