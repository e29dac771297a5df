//! # sbomv CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sbomv_cli::schema::{run_schema, SchemaArgs};
use sbomv_cli::validate::{run_validate, ValidateArgs};
use sbomv_cli::versions::{run_versions, VersionsArgs};

/// sbomv: CycloneDX SBOM validator
///
/// Validates CycloneDX JSON SBOMs against the official schema of their
/// declared specVersion (1.5 or 1.6).
#[derive(Parser, Debug)]
#[command(name = "sbomv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate SBOM files against their declared spec version.
    Validate(ValidateArgs),

    /// List supported spec versions; optionally compile every schema.
    Versions(VersionsArgs),

    /// Print the bundled schema for a spec version.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level. Logs go to stderr so
    // stdout carries only reports.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("sbomv CLI starting");

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &mut stdout),
        Commands::Versions(args) => run_versions(args, &mut stdout),
        Commands::Schema(args) => run_schema(args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
