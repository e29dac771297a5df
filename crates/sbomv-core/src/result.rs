//! # Validation Results
//!
//! [`ValidationResult`] is the outcome of validating one document and
//! [`ValidationError`] is one normalized structural violation.
//!
//! ## Invariants
//!
//! - `valid == true` implies `errors` is empty.
//! - `valid == false` implies `errors` is non-empty.
//! - Every error carries a non-empty `message`.
//!
//! Both invariants are enforced by the constructors; the fields of
//! [`ValidationResult`] are private.

use serde::{Deserialize, Serialize};

/// Upper bound on the number of errors carried by one result.
pub const MAX_ERRORS: usize = 50;

/// Instance path used for violations that apply to the whole document.
pub const ROOT_PATH: &str = "/";

/// One normalized structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Human-readable description. Never empty.
    pub message: String,
    /// JSON-pointer-like location in the input document; `"/"` for the root.
    pub path: String,
    /// JSON-pointer-like location in the schema; absent for synthetic errors.
    pub schema_path: Option<String>,
    /// Kind of constraint violated (e.g. `"required"`, `"type"`).
    pub validator: Option<String>,
}

impl ValidationError {
    /// Build an error that is not attached to any schema location.
    ///
    /// An empty `message` is replaced so the non-empty invariant holds.
    pub fn synthetic(message: impl Into<String>, path: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "validation failed".to_string();
        }
        Self {
            message,
            path: path.into(),
            schema_path: None,
            validator: None,
        }
    }

    /// Attach a constraint kind.
    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    version: String,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// A successful result for `version`.
    pub fn valid(version: impl Into<String>) -> Self {
        Self {
            valid: true,
            version: version.into(),
            errors: Vec::new(),
        }
    }

    /// A failed result carrying `errors`.
    ///
    /// The list is truncated to [`MAX_ERRORS`]. An empty list is replaced
    /// by a single root-level error so the result is never invalid without
    /// an explanation. Ordering is the caller's responsibility.
    pub fn invalid(version: impl Into<String>, mut errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            errors.push(ValidationError::synthetic("validation failed", ROOT_PATH));
        }
        errors.truncate(MAX_ERRORS);
        Self {
            valid: false,
            version: version.into(),
            errors,
        }
    }

    /// A failed result with a single root-level synthetic error.
    pub fn internal(version: impl Into<String>, message: impl Into<String>) -> Self {
        Self::invalid(version, vec![ValidationError::synthetic(message, ROOT_PATH)])
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Resolved version, or `""` when none could be determined.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(path: &str) -> ValidationError {
        ValidationError {
            message: format!("bad {path}"),
            path: path.to_string(),
            schema_path: Some("/type".to_string()),
            validator: Some("type".to_string()),
        }
    }

    #[test]
    fn valid_result_has_no_errors() {
        let r = ValidationResult::valid("1.5");
        assert!(r.is_valid());
        assert_eq!(r.version(), "1.5");
        assert!(r.errors().is_empty());
    }

    #[test]
    fn invalid_result_keeps_errors_in_given_order() {
        let r = ValidationResult::invalid("1.6", vec![err("/b"), err("/a")]);
        assert!(!r.is_valid());
        let paths: Vec<&str> = r.errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }

    #[test]
    fn invalid_result_is_truncated() {
        let errors: Vec<_> = (0..120).map(|i| err(&format!("/{i:03}"))).collect();
        let r = ValidationResult::invalid("1.5", errors);
        assert_eq!(r.errors().len(), MAX_ERRORS);
        assert_eq!(r.errors()[0].path, "/000");
        assert_eq!(r.errors()[MAX_ERRORS - 1].path, "/049");
    }

    #[test]
    fn invalid_without_errors_gets_placeholder() {
        let r = ValidationResult::invalid("1.5", Vec::new());
        assert!(!r.is_valid());
        assert_eq!(r.errors().len(), 1);
        assert_eq!(r.errors()[0].path, ROOT_PATH);
        assert!(!r.errors()[0].message.is_empty());
    }

    #[test]
    fn internal_result_is_root_level_and_synthetic() {
        let r = ValidationResult::internal("1.5", "boom");
        let e = &r.errors()[0];
        assert_eq!(e.message, "boom");
        assert_eq!(e.path, "/");
        assert!(e.schema_path.is_none());
        assert!(e.validator.is_none());
    }

    #[test]
    fn synthetic_never_has_empty_message() {
        let e = ValidationError::synthetic("  ", "/");
        assert!(!e.message.trim().is_empty());
    }

    #[test]
    fn error_serializes_camel_case_with_nulls() {
        let e = ValidationError::synthetic("missing", "/specVersion").with_validator("specVersion");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["message"], "missing");
        assert_eq!(json["path"], "/specVersion");
        assert!(json["schemaPath"].is_null());
        assert_eq!(json["validator"], "specVersion");
        assert!(json.get("schema_path").is_none());
    }
}
