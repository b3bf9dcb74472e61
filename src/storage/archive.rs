//! On-disk bundle archive format
//!
//! A bundle file is a RON document mapping asset names to their bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::BundleError;

/// Serialized contents of one bundle file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleArchive {
    /// Asset bytes keyed by asset name
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl BundleArchive {
    /// Create an empty archive
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset; the name is case-folded
    #[must_use]
    pub fn with_asset(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(name.to_lowercase(), bytes.into());
        self
    }

    /// Read an archive from a bundle file. Asset names are case-folded, so
    /// hand-written files match the lowercase names resources resolve to.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn read(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|e| BundleError::Io(e.to_string()))?;
        let raw: Self = ron::from_str(&content).map_err(|e| BundleError::Parse(e.to_string()))?;
        Ok(Self {
            assets: raw
                .assets
                .into_iter()
                .map(|(name, bytes)| (name.to_lowercase(), bytes))
                .collect(),
        })
    }

    /// Write the archive to a bundle file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), BundleError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BundleError::Io(e.to_string()))?;
        }
        let ron_string = ron::ser::to_string(self).map_err(|e| BundleError::Parse(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| BundleError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/hero.ab");
        let archive = BundleArchive::new()
            .with_asset("Hero", b"mesh".to_vec())
            .with_asset("hero_icon", vec![0_u8, 255]);

        archive.write(&path).unwrap();
        let loaded = BundleArchive::read(&path).unwrap();

        assert_eq!(loaded, archive);
        assert_eq!(loaded.assets["hero"], b"mesh");
    }

    #[test]
    fn test_read_folds_hand_written_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.ab");
        std::fs::write(&path, r#"(assets: {"Hero": [1, 2], "HERO_Icon": [3]})"#).unwrap();

        let loaded = BundleArchive::read(&path).unwrap();

        assert_eq!(loaded.assets.keys().collect::<Vec<_>>(), vec!["hero", "hero_icon"]);
        assert_eq!(loaded.assets["hero"], vec![1, 2]);
    }

    #[test]
    fn test_read_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ab");
        std::fs::write(&path, "not ron at all {").unwrap();

        assert!(matches!(BundleArchive::read(&path), Err(BundleError::Parse(_))));
    }
}
