//! Bundled CycloneDX schema resources, embedded at compile time via
//! `include_str!`.
//!
//! The `bom-*` documents are the per-version entry points. `spdx` and
//! `jsf-0.82` are auxiliary documents the entry points reach through
//! relative `$ref`s; they are served to the engine's local retriever and
//! never fetched over the network.

/// CycloneDX 1.5 JSON schema.
pub const BOM_1_5: &str = include_str!("../schemas/bom-1.5.schema.json");

/// CycloneDX 1.6 JSON schema.
pub const BOM_1_6: &str = include_str!("../schemas/bom-1.6.schema.json");

/// SPDX license and exception identifiers referenced by `license.id`.
pub const SPDX: &str = include_str!("../schemas/spdx.schema.json");

/// JSON Signature Format referenced by every `signature` member.
pub const JSF_0_82: &str = include_str!("../schemas/jsf-0.82.schema.json");

/// Entry-point documents keyed by resource name.
pub const ENTRY_POINTS: &[(&str, &str)] = &[
    ("bom-1.5.schema.json", BOM_1_5),
    ("bom-1.6.schema.json", BOM_1_6),
];

/// Auxiliary documents keyed by resource name.
pub const AUXILIARY: &[(&str, &str)] = &[
    ("spdx.schema.json", SPDX),
    ("jsf-0.82.schema.json", JSF_0_82),
];

/// Look up an entry-point document by resource name.
pub fn entry_point(resource: &str) -> Option<&'static str> {
    ENTRY_POINTS
        .iter()
        .find(|(name, _)| *name == resource)
        .map(|(_, body)| *body)
}
