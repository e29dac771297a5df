//! # Versions Subcommand
//!
//! Lists the supported CycloneDX versions. With `--check`, loads and
//! compiles each schema and exits 1 if any fails.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sbomv_schema::DynValidator;

/// Arguments for the versions subcommand.
#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Load and compile every schema, reporting failures.
    #[arg(long)]
    pub check: bool,

    /// Read schemas from this directory instead of the bundled ones.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,
}

/// Execute the versions subcommand.
pub fn run_versions(args: &VersionsArgs, out: &mut impl Write) -> Result<u8> {
    let validator = DynValidator::from_optional_dir(args.schema_dir.as_deref());

    writeln!(out, "Supported CycloneDX versions:")?;
    for spec in validator.table().iter() {
        writeln!(out, "  {:<6} {:<24} ({})", spec.id, spec.resource, spec.schema_url_fragment)?;
    }

    if !args.check {
        return Ok(0);
    }

    writeln!(out)?;
    let mut failures = 0usize;
    for (version, outcome) in validator.warm_up() {
        match outcome {
            Ok(()) => writeln!(out, "  {version:<6} ok")?,
            Err(e) => {
                failures += 1;
                writeln!(out, "  {version:<6} FAILED: {e}")?;
            }
        }
    }

    Ok(if failures == 0 { 0 } else { 1 })
}
