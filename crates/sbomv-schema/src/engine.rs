//! # Schema Engine
//!
//! Narrow capability interface over a JSON Schema implementation: compile
//! a schema document into a handle, then evaluate documents against it.
//! The orchestrator depends only on [`SchemaEngine`], so it can be driven
//! by a scripted fake in tests.
//!
//! ## `JsonSchemaEngine`
//!
//! Backed by the `jsonschema` crate, pinned to draft-07 with format
//! assertions enabled. Before compiling, the schema is checked against the
//! draft-07 metaschema so a broken schema is reported as a broken schema
//! rather than as a confusing document failure.
//!
//! ## Reference Resolution
//!
//! CycloneDX schemas reference `spdx.schema.json` and
//! `jsf-0.82.schema.json` with relative `$ref`s. These resolve against the
//! schema's `$id` (`http://cyclonedx.org/schema/...`). A local retriever
//! maps such URIs to the bundled auxiliary documents by filename so that
//! validation never makes network requests.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;

use crate::bundled;
use crate::error::EngineError;

/// One raw violation as reported by an engine, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Human-readable description.
    pub message: String,
    /// JSON Pointer to the offending instance node; may be empty for the root.
    pub instance_path: String,
    /// JSON Pointer into the schema; may be empty or absent.
    pub schema_path: Option<String>,
    /// Constraint kind (`"required"`, `"type"`, ...), when known.
    pub keyword: Option<String>,
}

/// Compile schemas and evaluate documents against them.
pub trait SchemaEngine: Send + Sync {
    /// Ready-to-validate representation of one schema. Shared read-only
    /// across concurrent validations.
    type Handle: Send + Sync;

    /// Compile the schema document for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSchema`] on malformed schema content.
    fn compile(&self, version: &str, schema: &[u8]) -> Result<Self::Handle, EngineError>;

    /// Evaluate `document` and return every violation, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Evaluation`] if the engine itself fails.
    fn validate(&self, handle: &Self::Handle, document: &Value) -> Result<Vec<Violation>, EngineError>;
}

/// Resolves `$ref` URIs to documents held in memory.
///
/// Unknown URIs resolve to a permissive `{}` schema rather than a network
/// fetch.
struct LocalSchemaRetriever {
    /// Map from resource filename to schema value.
    schemas_by_name: Arc<HashMap<String, Value>>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_name.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str
            .split('#')
            .next()
            .unwrap_or(uri_str)
            .rsplit('/')
            .next()
            .unwrap_or(uri_str);

        if let Some(value) = self.schemas_by_name.get(filename) {
            return Ok(value.clone());
        }

        tracing::warn!(uri = uri_str, "unresolved schema reference, substituting permissive schema");
        Ok(serde_json::json!({}))
    }
}

/// A compiled draft-07 validator for one specification version.
pub struct CompiledSchema {
    version: String,
    validator: Validator,
}

impl CompiledSchema {
    /// Version this schema was compiled for.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// [`SchemaEngine`] backed by the `jsonschema` crate.
#[derive(Debug, Clone)]
pub struct JsonSchemaEngine {
    auxiliary: Arc<HashMap<String, Value>>,
}

impl JsonSchemaEngine {
    /// Engine with the bundled auxiliary documents registered.
    pub fn new() -> Self {
        let mut auxiliary = HashMap::new();
        for (name, body) in bundled::AUXILIARY {
            match serde_json::from_str::<Value>(body) {
                Ok(value) => {
                    auxiliary.insert((*name).to_string(), value);
                }
                Err(e) => tracing::error!(resource = *name, "bundled auxiliary schema is not JSON: {e}"),
            }
        }
        Self {
            auxiliary: Arc::new(auxiliary),
        }
    }

    /// Register an additional document for `$ref` resolution under `name`
    /// (a filename such as `"spdx.schema.json"` or a full URI).
    pub fn with_auxiliary(mut self, name: impl Into<String>, schema: Value) -> Self {
        Arc::make_mut(&mut self.auxiliary).insert(name.into(), schema);
        self
    }

    /// Names of the registered auxiliary documents, sorted.
    pub fn auxiliary_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.auxiliary.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for JsonSchemaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaEngine for JsonSchemaEngine {
    type Handle = CompiledSchema;

    fn compile(&self, version: &str, schema: &[u8]) -> Result<CompiledSchema, EngineError> {
        let invalid = |detail: String| EngineError::InvalidSchema {
            version: version.to_string(),
            detail,
        };

        let schema: Value = serde_json::from_slice(schema)
            .map_err(|e| invalid(format!("message: invalid JSON: {e}, schema_path: /")))?;

        if let Err(e) = jsonschema::draft7::meta::validate(&schema) {
            let schema_path = pointer_or_root(e.schema_path.as_str());
            let mut detail = format!("message: {e}, schema_path: {schema_path}");
            if let Some(keyword) = keyword_of(e.schema_path.as_str()) {
                detail.push_str(&format!(", validator: {keyword}"));
            }
            return Err(invalid(detail));
        }

        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .with_retriever(LocalSchemaRetriever {
                schemas_by_name: Arc::clone(&self.auxiliary),
            });

        let validator = opts
            .build(&schema)
            .map_err(|e| invalid(format!("message: {e}, schema_path: {}", pointer_or_root(e.schema_path.as_str()))))?;

        tracing::debug!(version, "compiled schema");

        Ok(CompiledSchema {
            version: version.to_string(),
            validator,
        })
    }

    fn validate(&self, handle: &CompiledSchema, document: &Value) -> Result<Vec<Violation>, EngineError> {
        // A panic inside the evaluator must not take the worker down with it.
        std::panic::catch_unwind(AssertUnwindSafe(|| {
            handle
                .validator
                .iter_errors(document)
                .map(|e| {
                    let schema_path = e.schema_path.as_str().to_string();
                    Violation {
                        message: e.to_string(),
                        instance_path: e.instance_path.as_str().to_string(),
                        keyword: keyword_of(&schema_path),
                        schema_path: Some(schema_path),
                    }
                })
                .collect::<Vec<_>>()
        }))
        .map_err(|payload| EngineError::Evaluation(panic_message(payload.as_ref())))
    }
}

/// The constraint keyword is the last segment of the schema path
/// (`/properties/bomFormat/enum` → `enum`).
fn keyword_of(schema_path: &str) -> Option<String> {
    schema_path
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
        .map(str::to_string)
}

fn pointer_or_root(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "engine panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(schema: Value) -> Result<CompiledSchema, EngineError> {
        JsonSchemaEngine::new().compile("test", schema.to_string().as_bytes())
    }

    #[test]
    fn keyword_is_last_schema_path_segment() {
        assert_eq!(keyword_of("/properties/bomFormat/enum").as_deref(), Some("enum"));
        assert_eq!(keyword_of("/required").as_deref(), Some("required"));
        assert_eq!(keyword_of(""), None);
        assert_eq!(keyword_of("/items/0"), None);
    }

    #[test]
    fn compile_rejects_non_json() {
        let err = JsonSchemaEngine::new().compile("1.5", b"{not json").unwrap_err();
        match err {
            EngineError::InvalidSchema { version, detail } => {
                assert_eq!(version, "1.5");
                assert!(detail.contains("invalid JSON"), "{detail}");
            }
            other => panic!("expected InvalidSchema, got {other:?}"),
        }
    }

    #[test]
    fn compile_rejects_metaschema_violation() {
        let err = compile(json!({"type": 42})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid schema for specVersion test ("), "{msg}");
        assert!(msg.contains("schema_path: "), "{msg}");
    }

    #[test]
    fn violations_carry_paths_and_keywords() {
        let handle = compile(json!({
            "type": "object",
            "required": ["name"],
            "properties": {"count": {"type": "integer"}}
        }))
        .unwrap();
        let engine = JsonSchemaEngine::new();

        let mut violations = engine.validate(&handle, &json!({"count": "x"})).unwrap();
        violations.sort_by(|a, b| a.instance_path.cmp(&b.instance_path));

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].instance_path, "");
        assert_eq!(violations[0].keyword.as_deref(), Some("required"));
        assert_eq!(violations[1].instance_path, "/count");
        assert_eq!(violations[1].schema_path.as_deref(), Some("/properties/count/type"));
        assert_eq!(violations[1].keyword.as_deref(), Some("type"));
        assert!(!violations[1].message.is_empty());
    }

    #[test]
    fn conforming_document_has_no_violations() {
        let handle = compile(json!({"type": "object"})).unwrap();
        assert!(JsonSchemaEngine::new().validate(&handle, &json!({})).unwrap().is_empty());
    }

    #[test]
    fn formats_are_asserted() {
        let handle = compile(json!({"properties": {"ts": {"type": "string", "format": "date-time"}}})).unwrap();
        let engine = JsonSchemaEngine::new();
        assert!(engine.validate(&handle, &json!({"ts": "2024-01-01T00:00:00Z"})).unwrap().is_empty());
        let violations = engine.validate(&handle, &json!({"ts": "yesterday"})).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].keyword.as_deref(), Some("format"));
    }

    #[test]
    fn relative_refs_resolve_to_auxiliary_documents() {
        let engine = JsonSchemaEngine::new().with_auxiliary(
            "colors.schema.json",
            json!({"enum": ["red", "green"]}),
        );
        let handle = engine
            .compile(
                "test",
                json!({
                    "$id": "http://example.com/schema/main.schema.json",
                    "properties": {"color": {"$ref": "colors.schema.json"}}
                })
                .to_string()
                .as_bytes(),
            )
            .unwrap();
        assert!(engine.validate(&handle, &json!({"color": "red"})).unwrap().is_empty());
        let violations = engine.validate(&handle, &json!({"color": "blue"})).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].instance_path, "/color");
    }

    #[test]
    fn bundled_auxiliary_documents_are_registered() {
        let engine = JsonSchemaEngine::new();
        assert_eq!(engine.auxiliary_names(), vec!["jsf-0.82.schema.json", "spdx.schema.json"]);
    }

    #[test]
    fn compiled_schema_remembers_version() {
        let handle = JsonSchemaEngine::new().compile("1.6", br#"{"type":"object"}"#).unwrap();
        assert_eq!(handle.version(), "1.6");
        assert!(format!("{handle:?}").contains("1.6"));
    }
}
