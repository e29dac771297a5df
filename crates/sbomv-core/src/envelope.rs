//! # Request & Response Envelopes
//!
//! The wire shape shared by the HTTP service and the CLI.
//!
//! ## Request
//!
//! A single JSON value. When it is an object whose `sbom` member is itself
//! an object, that member is the document to validate. Otherwise the whole
//! value must be an object and is validated as-is.
//!
//! ## Response
//!
//! ```text
//! valid    → {"valid": true,  "specVersion": "1.5"}
//! invalid  → {"valid": false, "specVersion": "1.7" | null, "errors": [...]}
//! request  → {"error": "Empty request body", "statusCode": 400}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RequestError;
use crate::result::{ValidationError, ValidationResult};

/// Extract the document to validate from a raw request body.
///
/// # Errors
///
/// Returns [`RequestError::EmptyBody`] for an empty or whitespace-only
/// body, [`RequestError::InvalidJson`] when the body does not parse, and
/// [`RequestError::NotAnObject`] when the top level is not an object.
pub fn extract_document(body: &[u8]) -> Result<Value, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::EmptyBody);
    }
    let value: Value = serde_json::from_slice(body)?;
    unwrap_envelope(value)
}

/// Apply the `sbom` unwrapping rule to an already-parsed value.
pub fn unwrap_envelope(value: Value) -> Result<Value, RequestError> {
    match value {
        Value::Object(mut map) => {
            if map.get("sbom").is_some_and(Value::is_object) {
                // Checked above.
                Ok(map.remove("sbom").unwrap_or_default())
            } else {
                Ok(Value::Object(map))
            }
        }
        _ => Err(RequestError::NotAnObject),
    }
}

/// Externally visible result of one validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// Whether the document conforms to its declared version's schema.
    pub valid: bool,
    /// Resolved specification version; `null` when none was determined.
    pub spec_version: Option<String>,
    /// At most 50 errors sorted by path; omitted when valid.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub errors: Option<Vec<ValidationError>>,
}

impl From<&ValidationResult> for ValidationResponse {
    fn from(result: &ValidationResult) -> Self {
        if result.is_valid() {
            return Self {
                valid: true,
                spec_version: Some(result.version().to_string()),
                errors: None,
            };
        }
        let spec_version = match result.version() {
            "" => None,
            v => Some(v.to_string()),
        };
        Self {
            valid: false,
            spec_version,
            errors: Some(result.errors().to_vec()),
        }
    }
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        Self::from(&result)
    }
}

/// Request-level error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub error: String,
    /// 400 for malformed input, 500 for internal failures.
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(status_code: u16, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code,
        }
    }
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}
