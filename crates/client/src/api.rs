//! HTTP client for the storefront subscription API.
//!
//! # Endpoints
//!
//! - `GET /api/ping`
//! - `POST /api/suscripciones` - create a subscription
//! - `GET /api/suscripciones` - list subscriptions, newest first
//!
//! Failures come back as `{"ok": false, "error": "..."}` and surface as
//! [`ClientError::Rejected`]. Anything that never got an HTTP answer is
//! [`ClientError::Network`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use coffee_box_core::SubscriptionSubmission;
use coffee_box_core::api::{
    ErrorResponse, PingResponse, SubscriptionCreated, SubscriptionList, SubscriptionSummary,
};
use coffee_box_core::types::SubscriptionId;

use crate::catalog::CATALOG_PATH;

/// Longest response excerpt kept in errors and logs.
const BODY_EXCERPT: usize = 200;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a failure envelope or a non-success status.
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered 2xx with a body that is not the expected JSON.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    /// Whether the request never reached the server (or its answer was lost).
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the same request may succeed later: a network failure or a
    /// 5xx answer. The server rolls back before answering 5xx, so nothing
    /// was stored.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::InvalidUrl(_) | Self::UnexpectedResponse(_) => false,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Debug)]
struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the storefront at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Create a client that sends requests through `http`.
    #[must_use]
    pub fn with_http_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join drops the last path segment unless it ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(ApiClientInner { http, base_url }),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// URL of the catalog document served next to the API.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL cannot be built.
    pub fn catalog_url(&self) -> Result<Url, ClientError> {
        Ok(self.inner.base_url.join(CATALOG_PATH)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Check that the API is up.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or is rejected.
    #[tracing::instrument(skip(self), fields(base_url = %self.inner.base_url))]
    pub async fn ping(&self) -> Result<PingResponse, ClientError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("api/ping")?)
            .send()
            .await?;
        decode(response).await
    }

    /// Send a submission and return the id the server assigned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] on transport failure and
    /// [`ClientError::Rejected`] when the server answers with a failure.
    #[tracing::instrument(skip(self, submission), fields(plan_id = %submission.plan_id))]
    pub async fn create_subscription(
        &self,
        submission: &SubscriptionSubmission,
    ) -> Result<SubscriptionId, ClientError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("api/suscripciones")?)
            .json(submission)
            .send()
            .await?;
        let created: SubscriptionCreated = decode(response).await?;

        tracing::info!(subscription_id = %created.subscription_id, "Subscription created");
        Ok(created.subscription_id)
    }

    /// List all subscriptions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or is rejected.
    #[tracing::instrument(skip(self))]
    pub async fn list_subscriptions(&self) -> Result<Vec<SubscriptionSummary>, ClientError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("api/suscripciones")?)
            .send()
            .await?;
        let list: SubscriptionList = decode(response).await?;
        Ok(list.data)
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Read the body as text first, then decode it as `T` or as the failure
/// envelope.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map_or_else(|_| excerpt(&body), |e| e.error);
        tracing::warn!(status = %status, error = %message, "API request rejected");
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(e) => match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(envelope) if !envelope.ok => Err(ClientError::Rejected {
                status: status.as_u16(),
                message: envelope.error,
            }),
            _ => {
                tracing::error!(
                    error = %e,
                    body = %excerpt(&body),
                    "Failed to decode API response"
                );
                Err(ClientError::UnexpectedResponse(e.to_string()))
            }
        },
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT).collect()
}
