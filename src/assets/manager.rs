//! Bundle manager
//!
//! The public surface of a bundle session. Every call is synchronous; failures
//! are logged and surface as `None` or a no-op, never as a panic.

use std::fmt;

use super::descriptor::{ResourceDescriptor, ResourceType};
use super::extractor::extract_asset;
use super::handle::AssetHandle;
use super::loader::BundleLoader;
use super::registry::BundleRegistry;
use super::source::BundleSource;
use super::unloader::BundleUnloader;
use crate::core::{BundleConfig, BundleError, CacheStats};

/// Reference-counted cache of bundles loaded from a [`BundleSource`].
///
/// One manager is one session: it owns every resident bundle and disposes
/// whatever is still resident on [`shutdown`](Self::shutdown) or drop.
pub struct BundleManager<S: BundleSource> {
    source: S,
    registry: BundleRegistry<S::Bundle>,
    stats: CacheStats,
    config: BundleConfig,
}

impl<S: BundleSource> BundleManager<S> {
    /// Start a session with the default configuration
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, BundleConfig::default())
    }

    /// Start a session with the given configuration
    #[must_use]
    pub fn with_config(source: S, config: BundleConfig) -> Self {
        Self {
            source,
            registry: BundleRegistry::new(),
            stats: CacheStats::new(),
            config,
        }
    }

    /// Resolve a resource name through the source.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error, which is also logged
    pub fn resolve(
        &mut self,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<ResourceDescriptor<S::Asset>, BundleError> {
        self.source
            .resolve_descriptor(name, resource_type)
            .inspect_err(|e| {
                self.stats.resolve_failures += 1;
                log::error!("Failed to resolve '{name}' (type {resource_type}): {e}");
            })
    }

    /// Fetch the asset named by the descriptor, loading its bundle and
    /// dependencies if needed.
    ///
    /// Every call that finds or loads the bundle takes one reference on it,
    /// even when the asset itself is missing. The asset is also recorded on
    /// the descriptor.
    pub fn load(&mut self, descriptor: &mut ResourceDescriptor<S::Asset>) -> Option<AssetHandle<S::Asset>> {
        let asset = if let Some(bundle) = self.registry.lookup_and_retain(&descriptor.name) {
            self.stats.cache_hits += 1;
            log::debug!("Bundle '{}' served from cache", descriptor.name);
            extract_asset(&self.source, bundle, &descriptor.name, &mut self.stats)
        } else {
            if !self.load_bundle(descriptor) {
                return None;
            }
            let bundle = self.registry.get(&descriptor.name)?.handle();
            extract_asset(&self.source, bundle, &descriptor.name, &mut self.stats)
        }?;

        descriptor.asset = Some(asset.clone());
        Some(asset)
    }

    /// Make the descriptor's bundle resident without extracting anything.
    ///
    /// Takes one reference like [`load`](Self::load). Returns whether the
    /// bundle is resident afterwards.
    pub fn load_bundle_only(&mut self, descriptor: &ResourceDescriptor<S::Asset>) -> bool {
        if self.registry.lookup_and_retain(&descriptor.name).is_some() {
            self.stats.cache_hits += 1;
            return true;
        }
        self.load_bundle(descriptor)
    }

    /// Asynchronous loading is not implemented.
    ///
    /// No dependency work is done and neither callback is ever invoked.
    ///
    /// # Errors
    ///
    /// Always returns [`BundleError::AsyncUnsupported`]
    pub fn load_async<F, P>(
        &mut self,
        descriptor: &ResourceDescriptor<S::Asset>,
        _on_loaded: F,
        _on_progress: P,
    ) -> Result<(), BundleError>
    where
        F: FnOnce(Option<AssetHandle<S::Asset>>),
        P: FnMut(f32),
    {
        log::warn!(
            "Asynchronous load of '{}' requested; use load() instead",
            descriptor.name
        );
        Err(BundleError::AsyncUnsupported)
    }

    /// Release this consumer's reference on its own bundle. Dependencies stay
    /// resident even if this was their last consumer.
    pub fn unload_resource(&mut self, descriptor: &ResourceDescriptor<S::Asset>, unload_objects: bool) {
        BundleUnloader::new(&self.source, &mut self.registry, &mut self.stats)
            .release_own(descriptor, unload_objects);
    }

    /// Release one reference on the descriptor's bundle and on each of its
    /// declared dependencies
    pub fn unload_all_resource(&mut self, descriptor: &ResourceDescriptor<S::Asset>, unload_objects: bool) {
        BundleUnloader::new(&self.source, &mut self.registry, &mut self.stats)
            .release_all(descriptor, unload_objects);
    }

    /// Dispose every resident bundle, whatever its reference count
    pub fn shutdown(&mut self) {
        if self.registry.is_empty() {
            return;
        }

        let unload_objects = self.config.unload_objects_on_shutdown;
        log::info!("Disposing {} resident bundle(s)", self.registry.len());
        for (name, bundle) in self.registry.drain() {
            log::debug!("Disposing bundle '{name}' at shutdown");
            self.source.dispose_bundle(bundle, unload_objects);
            self.stats.evictions += 1;
        }
    }

    /// Current reference count of a resident bundle
    #[must_use]
    pub fn reference_count(&self, name: &str) -> Option<u32> {
        self.registry.reference_count(name)
    }

    /// Check if a bundle is resident
    #[must_use]
    pub fn is_resident(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Number of resident bundles
    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.registry.len()
    }

    /// Names of resident bundles, sorted
    #[must_use]
    pub fn resident_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Cache statistics for this session
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The session configuration
    #[must_use]
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// The underlying bundle source
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    fn load_bundle(&mut self, descriptor: &ResourceDescriptor<S::Asset>) -> bool {
        match BundleLoader::new(&self.source, &mut self.registry, &mut self.stats)
            .load_with_dependencies(descriptor)
        {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to load bundle '{}': {e}", descriptor.name);
                false
            }
        }
    }
}

impl<S: BundleSource> Drop for BundleManager<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: BundleSource> fmt::Debug for BundleManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleManager")
            .field("resident", &self.registry.names())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
