//! # Schema Sources
//!
//! A [`SchemaSource`] turns a version identifier into raw schema bytes.
//! It knows nothing about compilation or caching; the
//! [`SchemaCache`](crate::SchemaCache) guarantees each version is loaded
//! at most once per successful load.
//!
//! - [`BundledSchemas`] serves the documents compiled into the binary.
//! - [`DirectorySchemaSource`] reads `<dir>/<resource>` from disk, using the
//!   resource names in a [`VersionTable`].

use std::path::{Path, PathBuf};

use sbomv_core::VersionTable;

use crate::bundled;
use crate::error::SourceError;

/// Produces raw schema documents by version identifier.
pub trait SchemaSource: Send + Sync {
    /// Load the schema document for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when no schema is registered for
    /// `version` or its resource does not exist, and
    /// [`SourceError::Unreadable`] when the resource exists but reading it
    /// fails.
    fn load(&self, version: &str) -> Result<Vec<u8>, SourceError>;
}

impl<T: SchemaSource + ?Sized> SchemaSource for Box<T> {
    fn load(&self, version: &str) -> Result<Vec<u8>, SourceError> {
        (**self).load(version)
    }
}

impl<T: SchemaSource + ?Sized> SchemaSource for std::sync::Arc<T> {
    fn load(&self, version: &str) -> Result<Vec<u8>, SourceError> {
        (**self).load(version)
    }
}

/// Schemas embedded in the binary.
#[derive(Debug, Clone)]
pub struct BundledSchemas {
    table: VersionTable,
}

impl BundledSchemas {
    /// Serve the bundled documents for the CycloneDX version table.
    pub fn new() -> Self {
        Self::with_table(VersionTable::cyclonedx().clone())
    }

    /// Serve bundled documents for the resources named in `table`.
    pub fn with_table(table: VersionTable) -> Self {
        Self { table }
    }

    /// The bundled schema text for `version`, if any.
    pub fn text(&self, version: &str) -> Option<&'static str> {
        self.table
            .get(version)
            .and_then(|spec| bundled::entry_point(&spec.resource))
    }
}

impl Default for BundledSchemas {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaSource for BundledSchemas {
    fn load(&self, version: &str) -> Result<Vec<u8>, SourceError> {
        self.text(version)
            .map(|text| text.as_bytes().to_vec())
            .ok_or_else(|| SourceError::NotFound {
                version: version.to_string(),
                reason: "no bundled schema registered".to_string(),
            })
    }
}

/// Schemas read from a directory at load time.
#[derive(Debug, Clone)]
pub struct DirectorySchemaSource {
    dir: PathBuf,
    table: VersionTable,
}

impl DirectorySchemaSource {
    /// Read the CycloneDX resources from `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_table(dir, VersionTable::cyclonedx().clone())
    }

    /// Read the resources named in `table` from `dir`.
    pub fn with_table(dir: impl AsRef<Path>, table: VersionTable) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            table,
        }
    }

    /// Returns the schema directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the schema for `version` would be read from.
    pub fn path_for(&self, version: &str) -> Option<PathBuf> {
        self.table
            .get(version)
            .map(|spec| self.dir.join(&spec.resource))
    }
}

impl SchemaSource for DirectorySchemaSource {
    fn load(&self, version: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.path_for(version).ok_or_else(|| SourceError::NotFound {
            version: version.to_string(),
            reason: "version is not in the schema table".to_string(),
        })?;

        tracing::debug!(version, path = %path.display(), "reading schema from disk");

        std::fs::read(&path).map_err(|e| {
            let reason = format!("cannot read {}: {e}", path.display());
            let version = version.to_string();
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound { version, reason }
            } else {
                SourceError::Unreadable { version, reason }
            }
        })
    }
}
