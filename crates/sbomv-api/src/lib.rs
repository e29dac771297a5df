//! # sbomv-api: Axum HTTP Service for SBOM Validation
//!
//! ## API Surface
//!
//! | Route                   | Module                    | Purpose                  |
//! |-------------------------|---------------------------|--------------------------|
//! | `POST /sbom/validate`   | [`routes::validate`]      | Validate one SBOM        |
//! | `GET /health/liveness`  | crate root                | Process is up            |
//! | `GET /health/readiness` | crate root                | Schemas compile          |
//! | `GET /metrics`          | crate root                | Prometheus scrape        |
//! | `GET /openapi.json`     | [`openapi`]               | OpenAPI 3.1 document     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → DefaultBodyLimit → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No validation logic in handlers; they delegate to `sbomv-schema`.
//! - All request-level failures map to `{"error", "statusCode"}` via
//!   [`AppError`].

pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(routes::validate::router())
        .merge(openapi::router())
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes));

    // Only register the metrics middleware and endpoint when metrics are enabled.
    if let Some(metrics) = state.metrics.clone() {
        router = router
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// GET /metrics: Prometheus metrics scrape endpoint.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: every supported schema can be loaded and compiled.
///
/// Compiled schemas stay cached, so after the first successful probe this
/// is a map lookup per version. Returns 200 "ready" or 503 naming the
/// versions that failed.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let validator = std::sync::Arc::clone(&state.validator);
    let report = match tokio::task::spawn_blocking(move || validator.warm_up()).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("readiness check task failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "readiness check failed".to_string()).into_response();
        }
    };

    let failures: Vec<String> = report
        .into_iter()
        .filter_map(|(version, outcome)| outcome.err().map(|e| format!("{version}: {e}")))
        .collect();

    if failures.is_empty() {
        (StatusCode::OK, "ready".to_string()).into_response()
    } else {
        let msg = format!("schemas unavailable: {}", failures.join("; "));
        tracing::warn!("{msg}");
        (StatusCode::SERVICE_UNAVAILABLE, msg).into_response()
    }
}
