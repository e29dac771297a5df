//! # OpenAPI Specification Assembly
//!
//! Serves the generated OpenAPI 3.1 document at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "sbomv: CycloneDX SBOM Validation API",
        description = "Validates CycloneDX JSON SBOMs against the official schema of their declared `specVersion` (1.5 or 1.6).\n\nDocuments may be posted bare or wrapped as `{\"sbom\": {...}}`. Errors are sorted by instance path and capped at 50.",
        license(name = "Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::validate::validate_sbom,
    ),
    components(
        schemas(
            crate::routes::validate::SbomDocument,
            sbomv_core::ValidationResponse,
            sbomv_core::ValidationError,
            sbomv_core::ErrorResponse,
        ),
    ),
    tags(
        (name = "validation", description = "CycloneDX schema validation"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
