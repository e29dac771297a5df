//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request and validation metrics.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly; see
//! [`app`](crate::app).

pub mod metrics;
