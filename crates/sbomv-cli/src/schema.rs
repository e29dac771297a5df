//! # Schema Subcommand
//!
//! Prints the bundled schema document for one version, e.g. to seed a
//! `--schema-dir` / `SBOMV_SCHEMA_DIR` directory.

use std::io::Write;

use anyhow::{bail, Result};
use clap::Args;
use sbomv_core::VersionTable;
use sbomv_schema::BundledSchemas;

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Specification version, e.g. `1.6`.
    pub version: String,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, out: &mut impl Write) -> Result<u8> {
    let Some(text) = BundledSchemas::new().text(&args.version) else {
        bail!(
            "no bundled schema for specVersion '{}'; supported: {}",
            args.version,
            VersionTable::cyclonedx().ids().join(", ")
        );
    };
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_bundled_schema() {
        let mut out = Vec::new();
        let code = run_schema(&SchemaArgs { version: "1.5".to_string() }, &mut out).unwrap();
        assert_eq!(code, 0);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value["$id"].as_str().unwrap().ends_with("bom-1.5.schema.json"));
    }

    #[test]
    fn unknown_version_is_an_error() {
        let mut out = Vec::new();
        let err = run_schema(&SchemaArgs { version: "1.4".to_string() }, &mut out).unwrap_err();
        assert!(err.to_string().contains("supported: 1.5, 1.6"));
        assert!(out.is_empty());
    }
}
