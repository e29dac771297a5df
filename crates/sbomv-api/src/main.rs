//! # sbomv-api entry point
//!
//! Reads [`AppConfig`] from the environment, initializes tracing, optionally
//! warms the schema cache, and serves the router until Ctrl-C.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sbomv_api::state::{AppConfig, AppState, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config);

    tracing::info!(
        port = config.port,
        schema_dir = ?config.schema_dir,
        metrics_enabled = config.metrics_enabled,
        body_limit_bytes = config.body_limit_bytes,
        "sbomv-api starting"
    );

    let warm_cache = config.warm_cache;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::with_config(config);

    if warm_cache {
        let validator = std::sync::Arc::clone(&state.validator);
        let report = tokio::task::spawn_blocking(move || validator.warm_up())
            .await
            .context("schema warm-up task failed")?;
        for (version, outcome) in report {
            match outcome {
                Ok(()) => tracing::info!(version = %version, "schema ready"),
                Err(e) => tracing::warn!(version = %version, error = %e, "schema not ready"),
            }
        }
    }

    let app = sbomv_api::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("sbomv-api listening on {addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("sbomv-api stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
