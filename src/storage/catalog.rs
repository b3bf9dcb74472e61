//! Bundle catalog
//!
//! Describes where each resource type lives and what each bundle depends on.
//! Stored as RON next to the bundles:
//!
//! ```ron
//! (
//!     types: { 1: "ui", 2: "units" },
//!     bundles: {
//!         "common": (dependencies: []),
//!         "hero": (dependencies: ["common"]),
//!         "atlas": (path: Some("shared/atlas")),
//!     },
//! )
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::ResourceType;
use crate::core::BundleError;

/// Catalog entry for one bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    /// Explicit physical path, overriding the one derived from the type
    pub path: Option<String>,
    /// Bundles to load first, in order
    pub dependencies: Vec<String>,
}

/// Resource type directories and bundle dependency lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleCatalog {
    /// Directory prefix per resource type
    pub types: BTreeMap<u32, String>,
    /// Bundle entries keyed by name
    pub bundles: BTreeMap<String, CatalogEntry>,
}

impl BundleCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource type directory
    #[must_use]
    pub fn with_type(mut self, resource_type: ResourceType, directory: impl Into<String>) -> Self {
        self.types.insert(resource_type.0, directory.into());
        self
    }

    /// Add a bundle entry
    #[must_use]
    pub fn with_bundle(mut self, name: impl Into<String>, entry: CatalogEntry) -> Self {
        self.bundles.insert(name.into(), entry);
        self.normalized()
    }

    /// Parse a catalog from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid catalog
    pub fn from_ron_str(text: &str) -> Result<Self, BundleError> {
        let catalog: Self = ron::from_str(text).map_err(|e| BundleError::Parse(e.to_string()))?;
        Ok(catalog.normalized())
    }

    /// Load a catalog from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|e| BundleError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the catalog to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), BundleError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| BundleError::Parse(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| BundleError::Io(e.to_string()))
    }

    /// Directory for a resource type
    #[must_use]
    pub fn type_directory(&self, resource_type: ResourceType) -> Option<&str> {
        self.types.get(&resource_type.0).map(String::as_str)
    }

    /// Entry for a case-folded bundle name
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.bundles.get(name)
    }

    /// Case-fold every name, path and dependency
    fn normalized(self) -> Self {
        let types = self
            .types
            .into_iter()
            .map(|(ty, dir)| (ty, normalize_path(&dir)))
            .collect();
        let bundles = self
            .bundles
            .into_iter()
            .map(|(name, entry)| {
                let entry = CatalogEntry {
                    path: entry.path.as_deref().map(normalize_path),
                    dependencies: entry.dependencies.iter().map(|d| d.to_lowercase()).collect(),
                };
                (name.to_lowercase(), entry)
            })
            .collect();
        Self { types, bundles }
    }
}

/// Case-fold a bundle path and strip surrounding separators
pub(crate) fn normalize_path(path: &str) -> String {
    path.trim_matches(|c| c == '/' || c == '\\')
        .replace('\\', "/")
        .to_lowercase()
}
