//! Filesystem bundle source
//!
//! Bundle files live under the configured root as `<path>.<suffix>`, and the
//! catalog next to them supplies type directories and dependencies.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::archive::BundleArchive;
use super::catalog::{BundleCatalog, normalize_path};
use crate::assets::{AssetHandle, BundleSource, ResourceDescriptor, ResourceType};
use crate::core::{BundleConfig, BundleError};

/// A bundle file opened from disk
#[derive(Debug)]
pub struct FsBundle {
    file: PathBuf,
    assets: FxHashMap<String, AssetHandle<Vec<u8>>>,
}

impl FsBundle {
    /// File the bundle was read from
    #[must_use]
    pub fn file(&self) -> &std::path::Path {
        &self.file
    }

    /// Names of the assets in this bundle, sorted
    #[must_use]
    pub fn asset_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Bundle source reading RON bundle archives from a directory
#[derive(Debug, Clone)]
pub struct FsBundleSource {
    config: BundleConfig,
    catalog: BundleCatalog,
}

impl FsBundleSource {
    /// Create a source from a configuration and an already loaded catalog
    #[must_use]
    pub fn new(config: BundleConfig, catalog: BundleCatalog) -> Self {
        Self { config, catalog }
    }

    /// Create a source, reading the catalog named by the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed
    pub fn from_config(config: BundleConfig) -> Result<Self, BundleError> {
        let catalog = BundleCatalog::load_ron(config.catalog_path())?;
        log::info!(
            "Loaded bundle catalog with {} bundle(s) from {}",
            catalog.bundles.len(),
            config.catalog_path().display()
        );
        Ok(Self::new(config, catalog))
    }

    /// The source configuration
    #[must_use]
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// The loaded catalog
    #[must_use]
    pub fn catalog(&self) -> &BundleCatalog {
        &self.catalog
    }

    fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.catalog
            .entry(name)
            .map(|entry| entry.dependencies.clone())
            .unwrap_or_default()
    }
}

impl BundleSource for FsBundleSource {
    type Bundle = FsBundle;
    type Asset = Vec<u8>;

    fn resolve_descriptor(
        &self,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<ResourceDescriptor<Vec<u8>>, BundleError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(BundleError::UnknownResource { name });
        }

        let explicit = self.catalog.entry(&name).and_then(|entry| entry.path.clone());
        let path = match (explicit, self.catalog.type_directory(resource_type)) {
            (Some(path), _) => path,
            (None, Some(dir)) if !dir.is_empty() => normalize_path(&format!("{dir}/{name}")),
            (None, _) => normalize_path(&name),
        };

        let dependencies = self.dependencies_of(&name);
        Ok(ResourceDescriptor::new(name, resource_type, path).with_dependencies(dependencies))
    }

    fn resolve_dependency_descriptor(&self, name: &str) -> Option<ResourceDescriptor<Vec<u8>>> {
        let name = name.to_lowercase();
        let entry = self.catalog.entry(&name)?;
        let path = entry.path.clone().unwrap_or_else(|| normalize_path(&name));

        Some(
            ResourceDescriptor::new(name, ResourceType::default(), path)
                .with_dependencies(entry.dependencies.iter().cloned()),
        )
    }

    fn open_bundle(&self, path: &str) -> Result<FsBundle, BundleError> {
        if path.is_empty() {
            return Err(BundleError::EmptyPath {
                name: String::new(),
            });
        }

        let file = self.config.bundle_file(path);
        let archive = BundleArchive::read(&file).map_err(|e| BundleError::OpenFailed {
            path: file.display().to_string(),
            reason: e.to_string(),
        })?;

        let assets = archive
            .assets
            .into_iter()
            .map(|(name, bytes)| (name.clone(), AssetHandle::new(name, bytes)))
            .collect();
        Ok(FsBundle { file, assets })
    }

    fn extract_asset(&self, bundle: &FsBundle, name: &str) -> Option<AssetHandle<Vec<u8>>> {
        bundle.assets.get(name).cloned()
    }

    fn dispose_bundle(&self, bundle: FsBundle, unload_objects: bool) {
        let live = bundle
            .assets
            .values()
            .filter(|handle| handle.strong_count() > 1)
            .count();

        if unload_objects {
            bundle.assets.values().for_each(AssetHandle::unload);
            if live > 0 {
                log::debug!(
                    "Unloaded {} asset(s) from {} still held by callers",
                    live,
                    bundle.file.display()
                );
            }
        } else if live > 0 {
            log::debug!(
                "{} asset(s) from {} outlive their bundle",
                live,
                bundle.file.display()
            );
        }
        log::trace!("Closed bundle file {}", bundle.file.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::BundleManager;
    use crate::storage::CatalogEntry;

    struct Fixture {
        _dir: tempfile::TempDir,
        source: FsBundleSource,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = BundleConfig::default().with_root(dir.path());

        let catalog = BundleCatalog::new()
            .with_type(ResourceType(1), "ui")
            .with_type(ResourceType(2), "units")
            .with_bundle("common", CatalogEntry::default())
            .with_bundle(
                "hero",
                CatalogEntry {
                    path: None,
                    dependencies: vec!["common".to_string(), "missing".to_string()],
                },
            );
        catalog.save_ron(config.catalog_path()).unwrap();

        BundleArchive::new()
            .with_asset("common", b"shared".to_vec())
            .write(config.bundle_file("common"))
            .unwrap();
        BundleArchive::new()
            .with_asset("hero", b"hero-mesh".to_vec())
            .write(config.bundle_file("units/hero"))
            .unwrap();

        let source = FsBundleSource::from_config(config).unwrap();
        Fixture { _dir: dir, source }
    }

    #[test]
    fn test_resolve_descriptor() {
        let fx = fixture();

        let desc = fx.source.resolve_descriptor("Hero", ResourceType(2)).unwrap();
        assert_eq!(desc.name, "hero");
        assert_eq!(desc.path, "units/hero");
        assert_eq!(desc.dependencies, vec!["common", "missing"]);

        let untyped = fx.source.resolve_descriptor("Loose", ResourceType(42)).unwrap();
        assert_eq!(untyped.path, "loose");
        assert!(untyped.dependencies.is_empty());

        assert!(fx.source.resolve_descriptor("  ", ResourceType(1)).is_err());
        assert!(fx.source.resolve_dependency_descriptor("COMMON").is_some());
        assert!(fx.source.resolve_dependency_descriptor("missing").is_none());
    }

    #[test]
    fn test_open_failures() {
        let fx = fixture();

        assert!(matches!(fx.source.open_bundle(""), Err(BundleError::EmptyPath { .. })));
        assert!(matches!(
            fx.source.open_bundle("units/nobody"),
            Err(BundleError::OpenFailed { .. })
        ));
    }

    #[test]
    fn test_open_and_extract() {
        let fx = fixture();

        let bundle = fx.source.open_bundle("units/hero").unwrap();
        assert_eq!(bundle.asset_names(), vec!["hero"]);
        assert!(bundle.file().ends_with("units/hero.ab"));

        let asset = fx.source.extract_asset(&bundle, "hero").unwrap();
        assert_eq!(asset.get().map(Vec::as_slice), Some(&b"hero-mesh"[..]));

        fx.source.dispose_bundle(bundle, false);
        // The extracted handle stays valid after its bundle is gone
        assert_eq!(asset.name(), "hero");
        assert_eq!(asset.strong_count(), 1);
        assert!(asset.is_loaded());
    }

    #[test]
    fn test_dispose_with_unload_invalidates_assets() {
        let fx = fixture();

        let bundle = fx.source.open_bundle("common").unwrap();
        let asset = fx.source.extract_asset(&bundle, "common").unwrap();
        fx.source.dispose_bundle(bundle, true);

        assert!(!asset.is_loaded());
        assert!(asset.get().is_none());
    }

    #[test]
    fn test_mixed_case_archive_is_found() {
        let fx = fixture();
        let file = fx.source.config().bundle_file("villain");
        std::fs::write(&file, r#"(assets: {"Villain": [1, 2]})"#).unwrap();
        let mut manager = BundleManager::new(fx.source.clone());
        let mut villain = manager.resolve("Villain", ResourceType::default()).unwrap();

        let asset = manager.load(&mut villain).unwrap();

        assert_eq!(asset.name(), "villain");
        assert_eq!(asset.get(), Some(&vec![1, 2]));
        assert_eq!(manager.stats().extract_failures, 0);
    }

    #[test]
    fn test_manager_over_filesystem() {
        let fx = fixture();
        let mut manager = BundleManager::new(fx.source.clone());
        let mut hero = manager.resolve("HERO", ResourceType(2)).unwrap();

        let asset = manager.load(&mut hero).unwrap();
        assert_eq!(asset.get().map(Vec::as_slice), Some(&b"hero-mesh"[..]));
        assert_eq!(manager.resident_names(), vec!["common", "hero"]);
        assert_eq!(manager.stats().resolve_failures, 1);

        manager.unload_all_resource(&hero, false);
        assert_eq!(manager.resident_count(), 0);
        // "missing" was never loaded, so releasing it is an over-release
        assert_eq!(manager.stats().over_releases, 1);
    }
}
