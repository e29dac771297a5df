//! # Supported Versions & Version Resolution
//!
//! The set of CycloneDX specification versions this service can validate
//! is plain configuration data: an ordered [`VersionTable`] of
//! [`VersionSpec`] rows assembled once at startup. Adding a version means
//! adding a row and shipping the matching schema resource; no code path
//! branches on a particular version string.
//!
//! [`resolve_version`] inspects an input document and determines which
//! version it claims to follow:
//!
//! 1. A `specVersion` string that is non-empty after trimming wins, even
//!    when it names an unsupported version.
//! 2. Otherwise a `$schema` URL containing a known fragment (`bom-1.5`,
//!    `bom-1.6`) maps to that version.
//! 3. Otherwise the version is the empty string.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One supported CycloneDX specification version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// Version identifier as it appears in `specVersion` (e.g. `"1.5"`).
    pub id: String,
    /// Substring identifying this version's canonical schema URL
    /// (e.g. `"bom-1.5"` in `http://cyclonedx.org/schema/bom-1.5.schema.json`).
    pub schema_url_fragment: String,
    /// Resource name of the schema document (e.g. `"bom-1.5.schema.json"`).
    pub resource: String,
}

impl VersionSpec {
    /// Build a row following the CycloneDX naming convention
    /// (`bom-<id>` fragment, `bom-<id>.schema.json` resource).
    pub fn cyclonedx(id: &str) -> Self {
        Self {
            id: id.to_string(),
            schema_url_fragment: format!("bom-{id}"),
            resource: format!("bom-{id}.schema.json"),
        }
    }
}

/// Immutable, ordered table of supported versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable {
    specs: Vec<VersionSpec>,
}

static CYCLONEDX: OnceLock<VersionTable> = OnceLock::new();

impl VersionTable {
    /// Build a table from explicit rows. Order matters for `$schema` URL
    /// matching: the first row whose fragment matches wins.
    pub fn new(specs: Vec<VersionSpec>) -> Self {
        Self { specs }
    }

    /// The process-wide CycloneDX table (1.5 and 1.6).
    pub fn cyclonedx() -> &'static VersionTable {
        CYCLONEDX.get_or_init(|| {
            VersionTable::new(vec![VersionSpec::cyclonedx("1.5"), VersionSpec::cyclonedx("1.6")])
        })
    }

    /// Whether `id` names a supported version.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Look up the row for `id`.
    pub fn get(&self, id: &str) -> Option<&VersionSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    /// Supported version identifiers, in table order.
    pub fn ids(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.id.as_str()).collect()
    }

    /// Iterate over all rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &VersionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Return the version whose schema URL fragment occurs in `url`.
    pub fn match_schema_url(&self, url: &str) -> Option<&VersionSpec> {
        self.specs
            .iter()
            .find(|s| url.contains(s.schema_url_fragment.as_str()))
    }

    /// Human-readable list of supported ids: `"1.5 or 1.6"`.
    pub fn expected_list(&self) -> String {
        self.ids().join(" or ")
    }
}

/// Determine the specification version a document claims to follow.
///
/// Never fails. Returns `""` when no version can be determined, including
/// when `document` is not a JSON object.
pub fn resolve_version(document: &Value, table: &VersionTable) -> String {
    if let Some(claimed) = document.get("specVersion").and_then(Value::as_str) {
        let claimed = claimed.trim();
        if !claimed.is_empty() {
            return claimed.to_string();
        }
    }

    document
        .get("$schema")
        .and_then(Value::as_str)
        .and_then(|url| table.match_schema_url(url))
        .map(|spec| spec.id.clone())
        .unwrap_or_default()
}
