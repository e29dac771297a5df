//! # SBOM Validation Route
//!
//! `POST /sbom/validate` accepts a CycloneDX JSON document, optionally
//! wrapped as `{"sbom": {...}}`, and answers with a
//! [`ValidationResponse`].
//!
//! | Outcome                        | Status | Body                 |
//! |--------------------------------|--------|----------------------|
//! | document valid                 | 200    | `ValidationResponse` |
//! | document invalid / unsupported | 400    | `ValidationResponse` |
//! | empty, oversized, unparsable   | 400    | `ErrorResponse`      |
//! | non-object                     | 400    | `ErrorResponse`      |
//! | schema or engine failure       | 500    | `ErrorResponse`      |
//!
//! Schema compilation and evaluation are CPU-bound and may block on a
//! first-use load, so they run on the blocking pool.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use sbomv_core::{extract_document, RequestError, ValidationResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::middleware::metrics::ValidationOutcome;
use crate::state::AppState;

/// A CycloneDX JSON document, or `{"sbom": <document>}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(value_type = Object)]
pub struct SbomDocument(pub serde_json::Value);

/// Build the validation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/sbom/validate", post(validate_sbom))
}

/// POST /sbom/validate: Validate one SBOM.
#[utoipa::path(
    post,
    path = "/sbom/validate",
    request_body = SbomDocument,
    responses(
        (status = 200, description = "Document conforms to its spec version", body = ValidationResponse),
        (status = 400, description = "Document invalid, version unsupported, or request malformed", body = ValidationResponse),
        (status = 500, description = "Schema unavailable or validator failure", body = sbomv_core::ErrorResponse),
    ),
    tag = "validation"
)]
async fn validate_sbom(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ValidationResponse>), AppError> {
    // Over-limit bodies get the request-error envelope, not axum's text body.
    let body = body.map_err(|rejection| {
        record(&state, "unknown", ValidationOutcome::RequestError);
        AppError::from(RequestError::UnreadableBody(rejection.body_text()))
    })?;

    let document = extract_document(&body).map_err(|e| {
        record(&state, "unknown", ValidationOutcome::RequestError);
        AppError::from(e)
    })?;

    let validator = Arc::clone(&state.validator);
    let outcome = tokio::task::spawn_blocking(move || validator.try_validate(&document)).await;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            record(&state, "unknown", ValidationOutcome::InternalError);
            return Err(e.into());
        }
        Err(e) => {
            record(&state, "unknown", ValidationOutcome::InternalError);
            return Err(AppError::Internal(format!("validation task failed: {e}")));
        }
    };

    let version_label = if state.validator.table().contains(result.version()) {
        result.version()
    } else {
        "unsupported"
    };

    let (status, outcome) = if result.is_valid() {
        (StatusCode::OK, ValidationOutcome::Valid)
    } else {
        (StatusCode::BAD_REQUEST, ValidationOutcome::Invalid)
    };
    record(&state, version_label, outcome);

    tracing::info!(
        spec_version = result.version(),
        valid = result.is_valid(),
        error_count = result.errors().len(),
        "sbom validated"
    );

    Ok((status, Json(ValidationResponse::from(&result))))
}

fn record(state: &AppState, spec_version: &str, outcome: ValidationOutcome) {
    if let Some(metrics) = &state.metrics {
        metrics.record_validation(spec_version, outcome);
    }
}
