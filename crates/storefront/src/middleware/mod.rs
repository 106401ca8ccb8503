//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (the form may be served from another origin)
//! 3. `TraceLayer` (`http_request` span with status and latency)
//! 4. Request ID (recorded on the span, echoed in the response)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
