//! # API Error Types
//!
//! Request-level failures, rendered as `{"error": ..., "statusCode": ...}`.
//! A document that fails validation is not an error here; it is a normal
//! 400 [`ValidationResponse`](sbomv_core::ValidationResponse).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sbomv_core::{ErrorResponse, RequestError};
use sbomv_schema::InternalError;
use thiserror::Error;

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed request body (400).
    #[error("{0}")]
    BadRequest(String),

    /// The service could not produce a verdict (500).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::BadRequest(_) => tracing::debug!(error = %self, "rejected request"),
        }

        let body = ErrorResponse::new(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<InternalError> for AppError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use sbomv_schema::SchemaUnavailable;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn request_errors_are_bad_requests() {
        let err = AppError::from(RequestError::EmptyBody);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Empty request body");
    }

    #[test]
    fn internal_errors_are_prefixed() {
        let err = AppError::from(InternalError::from(SchemaUnavailable::Missing {
            version: "1.5".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Internal error: No schema available for specVersion 1.5"
        );
    }

    #[tokio::test]
    async fn bad_request_renders_error_envelope() {
        let response = AppError::from(RequestError::NotAnObject).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Expected SBOM JSON object");
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn internal_renders_error_envelope() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal error: boom");
        assert_eq!(body["statusCode"], 500);
    }
}
