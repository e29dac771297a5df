//! # Application State & Configuration
//!
//! [`AppConfig`] is read once from `SBOMV_*` environment variables at
//! startup. [`AppState`] is the cheaply cloneable bundle handed to every
//! handler: the shared validator, the configuration and, when enabled,
//! the Prometheus metrics.

use std::path::PathBuf;
use std::sync::Arc;

use sbomv_schema::DynValidator;

use crate::middleware::metrics::ApiMetrics;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default request body limit (10 MiB).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Text,
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// TCP port to listen on (`SBOMV_PORT`).
    pub port: u16,
    /// Directory to read schema documents from instead of the bundled ones
    /// (`SBOMV_SCHEMA_DIR`).
    pub schema_dir: Option<PathBuf>,
    /// Whether `/metrics` and the metrics middleware are mounted
    /// (`SBOMV_METRICS_ENABLED`).
    pub metrics_enabled: bool,
    /// Maximum accepted request body size (`SBOMV_BODY_LIMIT_BYTES`).
    pub body_limit_bytes: usize,
    /// Compile every supported schema before serving (`SBOMV_WARM_CACHE`).
    pub warm_cache: bool,
    /// `tracing` filter directive (`SBOMV_LOG`).
    pub log_filter: String,
    /// Log output format (`SBOMV_LOG_FORMAT`).
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            schema_dir: None,
            metrics_enabled: true,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            warm_cache: false,
            log_filter: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// absent or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or("SBOMV_PORT", lookup("SBOMV_PORT"), defaults.port),
            schema_dir: lookup("SBOMV_SCHEMA_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            metrics_enabled: lookup("SBOMV_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.metrics_enabled),
            body_limit_bytes: parse_or(
                "SBOMV_BODY_LIMIT_BYTES",
                lookup("SBOMV_BODY_LIMIT_BYTES"),
                defaults.body_limit_bytes,
            ),
            warm_cache: lookup("SBOMV_WARM_CACHE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.warm_cache),
            log_filter: lookup("SBOMV_LOG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            log_format: match lookup("SBOMV_LOG_FORMAT").map(|v| v.to_lowercase()) {
                Some(v) if v == "text" || v == "pretty" => LogFormat::Text,
                _ => LogFormat::Json,
            },
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid value, using default {default}");
            default
        }),
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Validator shared by all requests. Its schema cache lives as long as
    /// the process.
    pub validator: Arc<DynValidator>,
    pub config: Arc<AppConfig>,
    /// Present when metrics are enabled.
    pub metrics: Option<ApiMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cached_versions", &self.validator.cached_versions())
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    /// State with default configuration and the bundled schemas.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// State for `config`. Reads schemas from `config.schema_dir` when set.
    pub fn with_config(config: AppConfig) -> Self {
        let validator = DynValidator::from_optional_dir(config.schema_dir.as_deref());
        Self::with_validator(config, validator)
    }

    /// State around an already-built validator.
    pub fn with_validator(config: AppConfig, validator: DynValidator) -> Self {
        let metrics = config.metrics_enabled.then(ApiMetrics::new);
        Self {
            validator: Arc::new(validator),
            config: Arc::new(config),
            metrics,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
