//! Coffee Box client library.
//!
//! Everything a front end needs to take a customer from the catalog to a
//! stored subscription:
//!
//! - [`catalog`] - Fetch or load the catalog and hold it in a [`Session`]
//! - [`form`] - Selection cascade and required-field checks of the subscription form
//! - [`store`] - Local fallback store for submissions, keyed by generated ids
//! - [`api`] - HTTP client for the storefront subscription API
//! - [`flow`] - Form → local store → POST, with fallback on network failure

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod flow;
pub mod form;
pub mod store;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, ClientError};
pub use catalog::{CatalogLoadError, CatalogProvider, Session};
pub use flow::{FlowError, ResendReport, SubmissionFlow, SubmissionOutcome};
pub use form::{CustomerField, FormError, SelectOption, SubscriptionForm};
pub use store::{
    JsonFileStore, KeyValueStore, LocalSubscriptionStore, MemoryStore, StoreError,
    StoredSubscription,
};
