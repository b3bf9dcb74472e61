//! Bundle manager configuration
//!
//! Supports loading settings from RON or JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::BundleError;

/// Configuration for a bundle session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Directory containing bundle files and the catalog
    pub root: PathBuf,
    /// Extension appended to every physical bundle path
    pub bundle_suffix: String,
    /// Catalog file, relative to `root`
    pub catalog: PathBuf,
    /// Also unload extracted objects when the session is torn down
    pub unload_objects_on_shutdown: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("bundles"),
            bundle_suffix: String::from("ab"),
            catalog: PathBuf::from("catalog.ron"),
            unload_objects_on_shutdown: true,
        }
    }
}

impl BundleConfig {
    /// Set the bundle root directory
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the bundle file extension
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.bundle_suffix = suffix.into();
        self
    }

    /// Set the catalog file (relative to the root)
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<PathBuf>) -> Self {
        self.catalog = catalog.into();
        self
    }

    /// Choose whether teardown also unloads extracted objects
    #[must_use]
    pub fn with_unload_objects_on_shutdown(mut self, unload: bool) -> Self {
        self.unload_objects_on_shutdown = unload;
        self
    }

    /// Full path of the catalog file
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.catalog)
    }

    /// Map a normalized bundle path to the file on disk
    #[must_use]
    pub fn bundle_file(&self, path: &str) -> PathBuf {
        if self.bundle_suffix.is_empty() {
            self.root.join(path)
        } else {
            self.root.join(format!("{path}.{}", self.bundle_suffix))
        }
    }

    /// Load the configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|e| BundleError::Io(e.to_string()))?;
        ron::from_str(&content).map_err(|e| BundleError::Parse(e.to_string()))
    }

    /// Load the configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|e| BundleError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| BundleError::Parse(e.to_string()))
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), BundleError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| BundleError::Parse(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| BundleError::Io(e.to_string()))
    }
}
