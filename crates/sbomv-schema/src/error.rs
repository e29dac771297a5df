//! # Error Types
//!
//! Failures of the schema collaborators and of the orchestration around
//! them. None of these describe a problem with the SBOM being validated;
//! they all mean the service cannot produce a verdict.

use thiserror::Error;

/// A Schema Source could not produce schema bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No schema is registered for the version, or its resource does not exist.
    #[error("No schema available for specVersion {version}: {reason}")]
    NotFound {
        /// Requested version identifier.
        version: String,
        /// Why the resource could not be produced.
        reason: String,
    },

    /// The resource exists but reading it failed.
    #[error("Cannot read schema for specVersion {version}: {reason}")]
    Unreadable {
        /// Requested version identifier.
        version: String,
        /// Underlying I/O failure.
        reason: String,
    },
}

/// A Schema Engine could not compile a schema or evaluate a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The schema document is malformed or violates the draft-07 metaschema.
    #[error("Invalid schema for specVersion {version} ({detail})")]
    InvalidSchema {
        /// Version whose schema failed to compile.
        version: String,
        /// `message: ..., schema_path: ...[, validator: ...]`.
        detail: String,
    },

    /// The engine failed while evaluating a document.
    #[error("{0}")]
    Evaluation(String),
}

/// No usable schema handle exists for an otherwise supported version.
///
/// Never cached: the next request for the same version retries the load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaUnavailable {
    /// The Schema Source has no entry for the version.
    #[error("No schema available for specVersion {version}")]
    Missing {
        /// Requested version identifier.
        version: String,
    },

    /// The schema resource exists but could not be read.
    #[error("Internal schema/validator error: cannot read schema for specVersion {version}: {reason}")]
    Unreadable {
        /// Requested version identifier.
        version: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// The schema was found but could not be compiled.
    #[error("Internal schema/validator error: InvalidSchema: {reason}")]
    Invalid {
        /// Requested version identifier.
        version: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The loader for this version panicked before producing a result.
    #[error("Internal schema/validator error: schema load for specVersion {version} was aborted")]
    Aborted {
        /// Requested version identifier.
        version: String,
    },
}

impl SchemaUnavailable {
    /// Version whose schema could not be produced.
    pub fn version(&self) -> &str {
        match self {
            Self::Missing { version }
            | Self::Unreadable { version, .. }
            | Self::Invalid { version, .. }
            | Self::Aborted { version } => version,
        }
    }
}

/// Internal failure of a validation call (500-class).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// No schema could be produced for the resolved version.
    #[error(transparent)]
    SchemaUnavailable(#[from] SchemaUnavailable),

    /// The engine failed while evaluating the document.
    #[error("Unexpected validation engine error: {0}")]
    Engine(String),
}
