//! # sbomv-core: Foundational Types for SBOM Validation
//!
//! Leaf crate of the workspace. Defines the data that flows through a
//! validation call without performing any I/O:
//!
//! - [`version`]: the supported CycloneDX [`VersionTable`] and the
//!   [`resolve_version`] fallback chain (`specVersion` → `$schema` → `""`).
//! - [`result`]: [`ValidationResult`] / [`ValidationError`], the stable,
//!   bounded result shape.
//! - [`envelope`]: request unwrapping (`{"sbom": {...}}`) and the JSON
//!   response bodies.
//! - [`error`]: [`RequestError`], malformed input detected before
//!   validation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sbomv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod envelope;
pub mod error;
pub mod result;
pub mod version;

pub use envelope::{extract_document, unwrap_envelope, ErrorResponse, ValidationResponse};
pub use error::RequestError;
pub use result::{ValidationError, ValidationResult, MAX_ERRORS, ROOT_PATH};
pub use version::{resolve_version, VersionSpec, VersionTable};
