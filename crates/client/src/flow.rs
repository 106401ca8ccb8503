//! Submission flow: form → local store → API.
//!
//! A submission is always written to the local store first. If the POST
//! succeeds the local copy is dropped. If the server cannot be reached or
//! answers 5xx it stays behind until [`SubmissionFlow::resend_pending`] is
//! called. A 4xx rejection drops the local copy, since resending the same
//! payload would be rejected again.

use thiserror::Error;
use uuid::Uuid;

use coffee_box_core::SubscriptionSubmission;
use coffee_box_core::types::SubscriptionId;

use crate::api::{ApiClient, ClientError};
use crate::form::{FormError, SubscriptionForm};
use crate::store::{KeyValueStore, LocalSubscriptionStore, StoreError};

/// Errors from the submission flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Where a submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Stored by the server under this id.
    Persisted { subscription_id: SubscriptionId },
    /// The server was unreachable or failed; kept locally under this id.
    StoredLocally { local_id: Uuid },
}

/// Result of replaying locally stored submissions.
#[derive(Debug, Default)]
pub struct ResendReport {
    /// Local id and server id of every record that went through.
    pub sent: Vec<(Uuid, SubscriptionId)>,
    /// Records that are still pending or were rejected, with the reason.
    pub failed: Vec<(Uuid, ClientError)>,
}

/// Drives submissions through the local store and the API client.
#[derive(Debug)]
pub struct SubmissionFlow<S> {
    api: ApiClient,
    store: LocalSubscriptionStore<S>,
}

impl<S: KeyValueStore> SubmissionFlow<S> {
    #[must_use]
    pub const fn new(api: ApiClient, store: LocalSubscriptionStore<S>) -> Self {
        Self { api, store }
    }

    #[must_use]
    pub const fn store(&self) -> &LocalSubscriptionStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Build the submission from `form` and submit it.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Form`] if the form is incomplete; otherwise see
    /// [`Self::submit`].
    pub async fn submit_form(
        &mut self,
        form: &SubscriptionForm,
    ) -> Result<SubmissionOutcome, FlowError> {
        let submission = form.submit()?;
        self.submit(submission).await
    }

    /// Store `submission` locally, then send it.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Store`] if the local store fails and
    /// [`FlowError::Api`] if the server rejects the submission with a 4xx.
    /// A network failure or a 5xx answer is not an error: the outcome is
    /// [`SubmissionOutcome::StoredLocally`].
    pub async fn submit(
        &mut self,
        submission: SubscriptionSubmission,
    ) -> Result<SubmissionOutcome, FlowError> {
        let record = self.store.save(submission)?;

        match self.api.create_subscription(&record.submission).await {
            Ok(subscription_id) => {
                self.store.remove(record.id)?;
                Ok(SubmissionOutcome::Persisted { subscription_id })
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    local_id = %record.id,
                    error = %e,
                    "Storefront unavailable, subscription kept locally"
                );
                Ok(SubmissionOutcome::StoredLocally {
                    local_id: record.id,
                })
            }
            Err(e) => {
                self.store.remove(record.id)?;
                Err(e.into())
            }
        }
    }

    /// Send every locally stored submission, oldest first.
    ///
    /// Records that reach the server are removed. Records that hit a network
    /// failure or a 5xx answer stay; records rejected with a 4xx are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Store`] if the local store fails.
    pub async fn resend_pending(&mut self) -> Result<ResendReport, FlowError> {
        let mut report = ResendReport::default();

        for record in self.store.list()? {
            match self.api.create_subscription(&record.submission).await {
                Ok(subscription_id) => {
                    self.store.remove(record.id)?;
                    report.sent.push((record.id, subscription_id));
                }
                Err(e) => {
                    if !e.is_retryable() {
                        self.store.remove(record.id)?;
                    }
                    tracing::warn!(local_id = %record.id, error = %e, "Resend failed");
                    report.failed.push((record.id, e));
                }
            }
        }

        tracing::info!(
            sent = report.sent.len(),
            failed = report.failed.len(),
            "Pending subscriptions resent"
        );
        Ok(report)
    }
}
