//! In-memory bundle source
//!
//! Bundles are registered up front; the source records every open and dispose
//! so callers can observe how the cache uses it.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::assets::{AssetHandle, BundleSource, ResourceDescriptor, ResourceType};
use crate::core::BundleError;

/// Registered bundle contents
#[derive(Debug)]
struct BundleDef<A> {
    name: String,
    path: String,
    dependencies: Vec<String>,
    assets: FxHashMap<String, Arc<A>>,
}

/// A bundle opened from a [`MemoryBundleSource`]
#[derive(Debug)]
pub struct MemoryBundle<A> {
    name: String,
    assets: FxHashMap<String, AssetHandle<A>>,
}

impl<A> MemoryBundle<A> {
    /// Bundle name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of assets in the bundle
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

/// Bundle source backed by a table of registered bundles
#[derive(Debug)]
pub struct MemoryBundleSource<A> {
    /// Definitions keyed by case-folded name
    bundles: FxHashMap<String, BundleDef<A>>,
    /// Name lookup by physical path
    path_to_name: FxHashMap<String, String>,
    opened: RefCell<Vec<String>>,
    disposed: RefCell<Vec<(String, bool)>>,
}

impl<A> MemoryBundleSource<A> {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: FxHashMap::default(),
            path_to_name: FxHashMap::default(),
            opened: RefCell::new(Vec::new()),
            disposed: RefCell::new(Vec::new()),
        }
    }

    /// Register a bundle. Names, paths and dependencies are case-folded.
    #[must_use]
    pub fn with_bundle(mut self, name: &str, path: &str, dependencies: &[&str], assets: &[(&str, A)]) -> Self
    where
        A: Clone,
    {
        self.add_bundle(name, path, dependencies, assets.iter().cloned());
        self
    }

    /// Register a bundle, replacing any bundle with the same name
    pub fn add_bundle<'n>(
        &mut self,
        name: &str,
        path: &str,
        dependencies: &[&str],
        assets: impl IntoIterator<Item = (&'n str, A)>,
    ) {
        let name = name.to_lowercase();
        let path = path.to_lowercase();
        let assets = assets
            .into_iter()
            .map(|(asset_name, value)| {
                (asset_name.to_lowercase(), Arc::new(value))
            })
            .collect();

        if let Some(old) = self.bundles.get(&name) {
            self.path_to_name.remove(&old.path);
        }
        self.path_to_name.insert(path.clone(), name.clone());
        self.bundles.insert(
            name.clone(),
            BundleDef {
                name,
                path,
                dependencies: dependencies.iter().map(|d| d.to_lowercase()).collect(),
                assets,
            },
        );
    }

    /// Paths successfully opened so far, in order
    #[must_use]
    pub fn open_order(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }

    /// How many times the bundle at `path` was opened
    #[must_use]
    pub fn open_count(&self, path: &str) -> usize {
        self.opened.borrow().iter().filter(|p| *p == path).count()
    }

    /// Disposed bundle names with the `unload_objects` flag they were disposed with
    #[must_use]
    pub fn disposals(&self) -> Vec<(String, bool)> {
        self.disposed.borrow().clone()
    }

    fn descriptor(def: &BundleDef<A>, resource_type: ResourceType) -> ResourceDescriptor<A> {
        ResourceDescriptor::new(def.name.clone(), resource_type, def.path.clone())
            .with_dependencies(def.dependencies.iter().cloned())
    }
}

impl<A> Default for MemoryBundleSource<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> BundleSource for MemoryBundleSource<A> {
    type Bundle = MemoryBundle<A>;
    type Asset = A;

    fn resolve_descriptor(
        &self,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<ResourceDescriptor<A>, BundleError> {
        let name = name.to_lowercase();
        self.bundles
            .get(&name)
            .map(|def| Self::descriptor(def, resource_type))
            .ok_or(BundleError::UnknownResource { name })
    }

    fn resolve_dependency_descriptor(&self, name: &str) -> Option<ResourceDescriptor<A>> {
        self.bundles
            .get(&name.to_lowercase())
            .map(|def| Self::descriptor(def, ResourceType::default()))
    }

    fn open_bundle(&self, path: &str) -> Result<MemoryBundle<A>, BundleError> {
        let def = self
            .path_to_name
            .get(path)
            .and_then(|name| self.bundles.get(name))
            .ok_or_else(|| BundleError::OpenFailed {
                path: path.to_string(),
                reason: "no bundle registered at this path".to_string(),
            })?;

        // Every open hands out fresh handles, so unloading one opening leaves
        // later ones usable
        let assets = def
            .assets
            .iter()
            .map(|(name, value)| (name.clone(), AssetHandle::from_shared(name.as_str(), Arc::clone(value))))
            .collect();

        self.opened.borrow_mut().push(path.to_string());
        Ok(MemoryBundle {
            name: def.name.clone(),
            assets,
        })
    }

    fn extract_asset(&self, bundle: &MemoryBundle<A>, name: &str) -> Option<AssetHandle<A>> {
        bundle.assets.get(name).cloned()
    }

    fn dispose_bundle(&self, bundle: MemoryBundle<A>, unload_objects: bool) {
        if unload_objects {
            bundle.assets.values().for_each(AssetHandle::unload);
        }
        self.disposed.borrow_mut().push((bundle.name, unload_objects));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_is_case_folded() {
        let source = MemoryBundleSource::new().with_bundle("Hero", "Units/Hero", &["Common"], &[("Hero", 1_u8)]);

        let desc = source.resolve_descriptor("HERO", ResourceType(4)).unwrap();
        assert_eq!(desc.name, "hero");
        assert_eq!(desc.path, "units/hero");
        assert_eq!(desc.dependencies, vec!["common"]);
        assert_eq!(desc.resource_type, ResourceType(4));

        assert!(source.resolve_dependency_descriptor("hero").is_some());
        assert!(source.resolve_dependency_descriptor("villain").is_none());
    }

    #[test]
    fn test_open_extract_dispose() {
        let source = MemoryBundleSource::new().with_bundle("ui", "ui", &[], &[("ui", "panel")]);

        let bundle = source.open_bundle("ui").unwrap();
        assert_eq!(bundle.name(), "ui");
        assert_eq!(bundle.asset_count(), 1);

        let first = source.extract_asset(&bundle, "ui").unwrap();
        let second = source.extract_asset(&bundle, "ui").unwrap();
        assert_eq!(first, second);
        assert!(source.extract_asset(&bundle, "missing").is_none());

        source.dispose_bundle(bundle, true);
        assert_eq!(source.disposals(), vec![("ui".to_string(), true)]);
        assert_eq!(source.open_count("ui"), 1);
        assert!(first.get().is_none());
    }

    #[test]
    fn test_reopen_after_unload_is_usable() {
        let source = MemoryBundleSource::new().with_bundle("ui", "ui", &[], &[("ui", 5_u8)]);

        let bundle = source.open_bundle("ui").unwrap();
        let old = source.extract_asset(&bundle, "ui").unwrap();
        source.dispose_bundle(bundle, true);

        let bundle = source.open_bundle("ui").unwrap();
        let new = source.extract_asset(&bundle, "ui").unwrap();
        assert!(!old.is_loaded());
        assert_eq!(new.get(), Some(&5));
        assert_ne!(old, new);
    }

    #[test]
    fn test_dispose_without_unload_keeps_assets() {
        let source = MemoryBundleSource::new().with_bundle("ui", "ui", &[], &[("ui", 5_u8)]);

        let bundle = source.open_bundle("ui").unwrap();
        let asset = source.extract_asset(&bundle, "ui").unwrap();
        source.dispose_bundle(bundle, false);

        assert_eq!(asset.get(), Some(&5));
    }

    #[test]
    fn test_unknown_path_rejected() {
        let source: MemoryBundleSource<u8> = MemoryBundleSource::new();
        let err = source.open_bundle("nowhere").unwrap_err();
        assert!(matches!(err, BundleError::OpenFailed { .. }));
        assert!(source.open_order().is_empty());
    }

    #[test]
    fn test_replacing_bundle_updates_path() {
        let mut source = MemoryBundleSource::new().with_bundle("ui", "old/ui", &[], &[("ui", 1_u8)]);
        source.add_bundle("ui", "new/ui", &[], [("ui", 2_u8)]);

        assert!(source.open_bundle("old/ui").is_err());
        let bundle = source.open_bundle("new/ui").unwrap();
        assert_eq!(source.extract_asset(&bundle, "ui").unwrap().get(), Some(&2));
    }
}
