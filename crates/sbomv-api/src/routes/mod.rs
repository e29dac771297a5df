//! # API Route Modules
//!
//! - `validate`: `POST /sbom/validate`.
//!
//! Health probes and `/metrics` live in the crate root next to the router
//! assembly.

pub mod validate;
