//! # Validate Subcommand
//!
//! Validates SBOM files with the same envelope rules as
//! `POST /sbom/validate`: a file may hold a bare document or
//! `{"sbom": {...}}`.
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | every file is valid                                        |
//! | 1    | at least one file is invalid                               |
//! | 2    | at least one file is unreadable, malformed or unverifiable |

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use sbomv_core::{extract_document, ErrorResponse, ValidationResponse};
use sbomv_schema::DynValidator;
use serde::Serialize;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// SBOM files to validate. `-` reads standard input.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Read `bom-<version>.schema.json` from this directory instead of the
    /// bundled schemas.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,
}

/// Output format of the validate subcommand.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One summary line per file, followed by `path: message` per error.
    Text,
    /// A JSON array with one response envelope per file.
    Json,
}

/// Verdict for one input file.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Outcome {
    Validated(ValidationResponse),
    Failed(ErrorResponse),
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    #[serde(flatten)]
    outcome: Outcome,
}

impl FileReport {
    fn exit_code(&self) -> u8 {
        match &self.outcome {
            Outcome::Validated(r) if r.valid => 0,
            Outcome::Validated(_) => 1,
            Outcome::Failed(_) => 2,
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> Result<u8> {
    let validator = DynValidator::from_optional_dir(args.schema_dir.as_deref());

    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| validate_file(&validator, path))
        .collect();

    match args.format {
        OutputFormat::Text => {
            for report in &reports {
                write_text(out, report)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports).context("failed to encode report")?;
            writeln!(out)?;
        }
    }

    Ok(reports.iter().map(FileReport::exit_code).max().unwrap_or(0))
}

fn validate_file(validator: &DynValidator, path: &Path) -> FileReport {
    let file = path.display().to_string();
    let outcome = match read_input(path) {
        Err(e) => Outcome::Failed(ErrorResponse::new(400, format!("{e:#}"))),
        Ok(bytes) => match extract_document(&bytes) {
            Err(e) => Outcome::Failed(ErrorResponse::from(&e)),
            Ok(document) => match validator.try_validate(&document) {
                Ok(result) => Outcome::Validated(ValidationResponse::from(&result)),
                Err(e) => Outcome::Failed(ErrorResponse::new(500, format!("Internal error: {e}"))),
            },
        },
    };
    tracing::debug!(file = %file, "validated file");
    FileReport { file, outcome }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("cannot read standard input")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

fn write_text(out: &mut impl Write, report: &FileReport) -> Result<()> {
    let file = &report.file;
    match &report.outcome {
        Outcome::Validated(r) => {
            let version = r.spec_version.as_deref().unwrap_or("none");
            if r.valid {
                writeln!(out, "{file}: valid (specVersion {version})")?;
            } else {
                let errors = r.errors.as_deref().unwrap_or_default();
                writeln!(
                    out,
                    "{file}: invalid (specVersion {version}), {} error(s)",
                    errors.len()
                )?;
                for e in errors {
                    writeln!(out, "  {}: {}", e.path, e.message)?;
                }
            }
        }
        Outcome::Failed(e) => writeln!(out, "{file}: error: {}", e.error)?,
    }
    Ok(())
}
