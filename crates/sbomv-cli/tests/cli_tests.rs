//! Integration test: run the validate subcommand over files on disk.

use std::path::{Path, PathBuf};

use sbomv_cli::validate::{run_validate, OutputFormat, ValidateArgs};
use serde_json::{json, Value};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(files: Vec<PathBuf>, format: OutputFormat) -> (u8, String) {
    let args = ValidateArgs {
        files,
        format,
        schema_dir: None,
    };
    let mut out = Vec::new();
    let code = run_validate(&args, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

fn valid_doc() -> String {
    json!({"bomFormat": "CycloneDX", "specVersion": "1.6", "version": 1}).to_string()
}

#[test]
fn all_valid_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let bare = write(dir.path(), "bare.json", &valid_doc());
    let wrapped = write(dir.path(), "wrapped.json", &format!(r#"{{"sbom": {}}}"#, valid_doc()));

    let (code, text) = run(vec![bare, wrapped], OutputFormat::Text);
    assert_eq!(code, 0, "{text}");
    assert_eq!(text.matches("valid (specVersion 1.6)").count(), 2);
}

#[test]
fn invalid_file_exits_one_and_lists_errors() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.json", &valid_doc());
    let bad = write(
        dir.path(),
        "bad.json",
        r#"{"bomFormat": "SPDX", "specVersion": "1.5", "version": 1}"#,
    );

    let (code, text) = run(vec![good, bad], OutputFormat::Text);
    assert_eq!(code, 1);
    assert!(text.contains("bad.json: invalid (specVersion 1.5), 1 error(s)"));
    assert!(text.contains("  /bomFormat: "));
}

#[test]
fn malformed_file_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "bad.json", r#"{"bomFormat": "SPDX", "specVersion": "1.5"}"#);
    let broken = write(dir.path(), "broken.json", "{not json");
    let missing = dir.path().join("missing.json");

    let (code, text) = run(vec![bad, broken, missing], OutputFormat::Text);
    assert_eq!(code, 2);
    assert!(text.contains("broken.json: error: Invalid JSON: "));
    assert!(text.contains("missing.json: error: cannot read "));
}

#[test]
fn json_output_has_one_envelope_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.json", &valid_doc());
    let unsupported = write(dir.path(), "old.json", r#"{"specVersion": "1.4"}"#);
    let empty = write(dir.path(), "empty.json", "   ");

    let (code, text) = run(vec![good, unsupported, empty], OutputFormat::Json);
    assert_eq!(code, 2);

    let reports: Vec<Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(reports.len(), 3);

    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[0]["specVersion"], "1.6");
    assert!(reports[0].get("errors").is_none());

    assert_eq!(reports[1]["valid"], false);
    assert_eq!(reports[1]["specVersion"], "1.4");
    assert_eq!(reports[1]["errors"][0]["path"], "/specVersion");

    assert_eq!(reports[2]["error"], "Empty request body");
    assert_eq!(reports[2]["statusCode"], 400);
    assert!(reports[2]["file"].as_str().unwrap().ends_with("empty.json"));
}

#[test]
fn schema_dir_without_schemas_is_an_internal_failure() {
    let schemas = tempfile::tempdir().unwrap();
    let docs = tempfile::tempdir().unwrap();
    let good = write(docs.path(), "good.json", &valid_doc());

    let args = ValidateArgs {
        files: vec![good],
        format: OutputFormat::Json,
        schema_dir: Some(schemas.path().to_path_buf()),
    };
    let mut out = Vec::new();
    let code = run_validate(&args, &mut out).unwrap();
    assert_eq!(code, 2);

    let reports: Vec<Value> = serde_json::from_slice(&out).unwrap();
    assert_eq!(reports[0]["statusCode"], 500);
    assert_eq!(
        reports[0]["error"],
        "Internal error: No schema available for specVersion 1.6"
    );
}
