//! # sbomv-schema: Schema Acquisition, Caching & Validation
//!
//! Everything between a parsed SBOM document and its
//! [`ValidationResult`](sbomv_core::ValidationResult):
//!
//! - [`source`]: [`SchemaSource`] implementations producing raw schema
//!   bytes per version ([`BundledSchemas`], [`DirectorySchemaSource`]).
//! - [`engine`]: the [`SchemaEngine`] capability and its `jsonschema`
//!   backed implementation ([`JsonSchemaEngine`], draft-07, formats
//!   asserted, `$ref`s resolved locally).
//! - [`cache`]: [`SchemaCache`], load-once memoization of compiled
//!   handles that never caches failures.
//! - [`validate`]: [`SbomValidator`], the orchestrator producing ordered,
//!   bounded results.
//! - [`bundled`]: the CycloneDX 1.5 / 1.6 schemas embedded in the binary.
//!
//! ## Crate Policy
//!
//! - Depends only on `sbomv-core` internally.
//! - No network I/O. Unresolvable `$ref`s fall back to a permissive schema.
//! - Schema problems are never reported as document problems: they surface
//!   as [`SchemaUnavailable`] / [`InternalError`].

pub mod bundled;
pub mod cache;
pub mod engine;
pub mod error;
pub mod source;
pub mod validate;

pub use cache::SchemaCache;
pub use engine::{CompiledSchema, JsonSchemaEngine, SchemaEngine, Violation};
pub use error::{EngineError, InternalError, SchemaUnavailable, SourceError};
pub use source::{BundledSchemas, DirectorySchemaSource, SchemaSource};
pub use validate::{DynValidator, SbomValidator};
