//! # Error Types
//!
//! Request-level failures detected before a document reaches the
//! validation orchestrator. Everything about the SBOM's own validity,
//! including an unsupported `specVersion`, is carried as data in a
//! [`ValidationResult`](crate::ValidationResult) instead.

use thiserror::Error;

/// Malformed request input (400-class).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The body was empty or whitespace only.
    #[error("Empty request body")]
    EmptyBody,

    /// The body could not be read, e.g. it exceeded the configured size limit.
    #[error("Unreadable request body: {0}")]
    UnreadableBody(String),

    /// The body could not be parsed as JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The body (or its `sbom` member) is not a JSON object.
    #[error("Expected SBOM JSON object")]
    NotAnObject,
}

impl RequestError {
    /// HTTP status code surfaced for this error.
    pub fn status_code(&self) -> u16 {
        400
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}
