//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded in the span, echoed in the response)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
