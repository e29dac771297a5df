//! # Validation Orchestrator
//!
//! [`SbomValidator`] turns one parsed SBOM document into a
//! [`ValidationResult`]:
//!
//! 1. Resolve the version (`specVersion`, then `$schema`, then `""`).
//! 2. Reject unsupported or missing versions with a single
//!    `/specVersion` error. No schema is loaded in that case.
//! 3. Fetch the compiled schema through the [`SchemaCache`], loading it
//!    from the [`SchemaSource`] and compiling it with the
//!    [`SchemaEngine`] on first use.
//! 4. Evaluate, normalize every violation, sort by instance path and keep
//!    the first [`MAX_ERRORS`](sbomv_core::MAX_ERRORS).
//!
//! [`SbomValidator::validate`] never fails: schema acquisition problems
//! become a synthetic root-level error. [`SbomValidator::try_validate`]
//! reports them as [`InternalError`] instead, for callers that must
//! distinguish "the document is wrong" from "the service is broken".

use std::path::Path;
use std::sync::Arc;

use sbomv_core::{resolve_version, ValidationError, ValidationResult, VersionTable, ROOT_PATH};
use serde_json::Value;

use crate::cache::SchemaCache;
use crate::engine::{JsonSchemaEngine, SchemaEngine, Violation};
use crate::error::{InternalError, SchemaUnavailable, SourceError};
use crate::source::{BundledSchemas, DirectorySchemaSource, SchemaSource};

/// Validator over a type-erased source and the `jsonschema` engine, as
/// used by the service and the CLI.
pub type DynValidator = SbomValidator<Box<dyn SchemaSource>, JsonSchemaEngine>;

/// Validates SBOM documents against the schema of their declared version.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct SbomValidator<S, E: SchemaEngine> {
    table: VersionTable,
    source: S,
    engine: E,
    cache: SchemaCache<E::Handle>,
}

impl<S: SchemaSource, E: SchemaEngine> SbomValidator<S, E> {
    /// Validator for the CycloneDX version table.
    pub fn new(source: S, engine: E) -> Self {
        Self::with_table(VersionTable::cyclonedx().clone(), source, engine)
    }

    pub fn with_table(table: VersionTable, source: S, engine: E) -> Self {
        Self {
            table,
            source,
            engine,
            cache: SchemaCache::new(),
        }
    }

    pub fn table(&self) -> &VersionTable {
        &self.table
    }

    /// Validate `document`. Never fails.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        let version = resolve_version(document, &self.table);
        match self.evaluate(&version, document) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(version = %version, error = %e, "validation could not complete");
                ValidationResult::internal(version, e.to_string())
            }
        }
    }

    /// Validate `document`, surfacing schema acquisition and engine
    /// failures as errors.
    ///
    /// # Errors
    ///
    /// Returns [`InternalError`] when no schema handle can be produced for a
    /// supported version or the engine fails during evaluation.
    pub fn try_validate(&self, document: &Value) -> Result<ValidationResult, InternalError> {
        let version = resolve_version(document, &self.table);
        self.evaluate(&version, document)
    }

    /// Load and compile the schema of every supported version.
    pub fn warm_up(&self) -> Vec<(String, Result<(), SchemaUnavailable>)> {
        self.table
            .iter()
            .map(|spec| {
                let outcome = self.schema(&spec.id).map(|_| ());
                if let Err(ref e) = outcome {
                    tracing::warn!(version = %spec.id, error = %e, "schema warm-up failed");
                }
                (spec.id.clone(), outcome)
            })
            .collect()
    }

    /// Versions whose schema is currently compiled and cached, sorted.
    pub fn cached_versions(&self) -> Vec<String> {
        self.cache.loaded_versions()
    }

    fn evaluate(&self, version: &str, document: &Value) -> Result<ValidationResult, InternalError> {
        if !self.table.contains(version) {
            tracing::debug!(version, "unsupported or missing specVersion");
            return Ok(ValidationResult::invalid(
                version,
                vec![self.unsupported_version(version)],
            ));
        }

        let handle = self.schema(version)?;
        let violations = self
            .engine
            .validate(&handle, document)
            .map_err(|e| InternalError::Engine(e.to_string()))?;

        let result = if violations.is_empty() {
            ValidationResult::valid(version)
        } else {
            let mut errors: Vec<ValidationError> =
                violations.into_iter().map(ValidationError::from).collect();
            errors.sort_by(|a, b| a.path.cmp(&b.path));
            ValidationResult::invalid(version, errors)
        };

        tracing::debug!(
            version,
            valid = result.is_valid(),
            error_count = result.errors().len(),
            "validated document"
        );
        Ok(result)
    }

    fn unsupported_version(&self, version: &str) -> ValidationError {
        let got = if version.is_empty() { "none" } else { version };
        ValidationError::synthetic(
            format!(
                "Unsupported or missing specVersion; expected {}, got '{got}'.",
                self.table.expected_list()
            ),
            "/specVersion",
        )
        .with_validator("specVersion")
    }

    fn schema(&self, version: &str) -> Result<Arc<E::Handle>, SchemaUnavailable> {
        self.cache.get_or_load(version, || self.load(version))
    }

    fn load(&self, version: &str) -> Result<E::Handle, SchemaUnavailable> {
        let bytes = self.source.load(version).map_err(|e| {
            tracing::warn!(version, error = %e, "schema source could not produce a document");
            match e {
                SourceError::NotFound { version, .. } => SchemaUnavailable::Missing { version },
                SourceError::Unreadable { version, reason } => {
                    SchemaUnavailable::Unreadable { version, reason }
                }
            }
        })?;

        let handle = self.engine.compile(version, &bytes).map_err(|e| {
            tracing::error!(version, error = %e, "schema failed to compile");
            SchemaUnavailable::Invalid {
                version: version.to_string(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(version, "schema loaded");
        Ok(handle)
    }
}

impl DynValidator {
    /// Validator over the schemas bundled into the binary.
    pub fn bundled() -> Self {
        Self::new(Box::new(BundledSchemas::new()), JsonSchemaEngine::new())
    }

    /// Validator reading `bom-<version>.schema.json` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(
            Box::new(DirectorySchemaSource::new(dir)),
            JsonSchemaEngine::new(),
        )
    }

    /// [`from_dir`](Self::from_dir) when a directory is configured,
    /// otherwise [`bundled`](Self::bundled).
    pub fn from_optional_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::bundled(),
        }
    }
}

impl From<Violation> for ValidationError {
    fn from(v: Violation) -> Self {
        let message = if v.message.trim().is_empty() {
            match v.keyword.as_deref() {
                Some(keyword) => format!("constraint '{keyword}' not satisfied"),
                None => "validation failed".to_string(),
            }
        } else {
            v.message
        };
        Self {
            message,
            path: or_root(v.instance_path),
            schema_path: v.schema_path.map(or_root),
            validator: v.keyword,
        }
    }
}

fn or_root(pointer: String) -> String {
    if pointer.is_empty() {
        ROOT_PATH.to_string()
    } else {
        pointer
    }
}
