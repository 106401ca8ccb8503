//! Coffee Box Core - Shared types library.
//!
//! This crate provides common types used across all Coffee Box components:
//! - `storefront` - HTTP backend that persists subscriptions
//! - `client` - Catalog, form, local store and API client used by front ends
//! - `cli` - Command-line tools for migrations, seeding and subscribing
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! on both sides of the wire.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`catalog`] - The static catalog of plans, brands and grind options
//! - [`submission`] - The subscription submission object and its validation
//! - [`api`] - JSON envelopes exchanged by the storefront API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod submission;
pub mod types;

pub use catalog::{Catalog, CatalogError, CoffeeBrand, GrindOption, Plan};
pub use submission::{
    BrandSelection, CustomerDetails, SubmissionError, SubscriptionSubmission, ValidatedCustomer,
    ValidatedSubmission,
};
pub use types::*;
