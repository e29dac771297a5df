//! # sbomv-cli: Command-Line SBOM Validation
//!
//! Provides the `sbomv` command-line interface over the same validator the
//! HTTP service uses.
//!
//! ## Subcommands
//!
//! - `sbomv validate`: Validate one or more SBOM files.
//! - `sbomv versions`: List supported versions, optionally compiling each schema.
//! - `sbomv schema`: Print a bundled schema document.
//!
//! ```bash
//! sbomv validate bom.json --format json
//! sbomv validate - < bom.json
//! sbomv versions --check --schema-dir ./schemas
//! sbomv schema 1.6 > bom-1.6.schema.json
//! ```
//!
//! Each `run_*` function writes to the supplied writer and returns the
//! process exit code.

pub mod schema;
pub mod validate;
pub mod versions;
