//! Thread-safe bundle manager
//!
//! Wraps a [`BundleManager`] in a mutex so several threads can share one
//! session. Each operation holds the lock for its whole duration, so a release
//! to zero can never interleave with a retain of the same bundle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::descriptor::{ResourceDescriptor, ResourceType};
use super::handle::AssetHandle;
use super::manager::BundleManager;
use super::source::BundleSource;
use crate::core::{BundleError, CacheStats};

/// Cloneable, lock-protected handle to one bundle session
pub struct SharedBundleManager<S: BundleSource> {
    inner: Arc<Mutex<BundleManager<S>>>,
}

impl<S: BundleSource> SharedBundleManager<S> {
    /// Share an existing session
    #[must_use]
    pub fn new(manager: BundleManager<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    // Every operation leaves the registry consistent before returning, so a
    // poisoned lock still guards valid state.
    fn lock(&self) -> MutexGuard<'_, BundleManager<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`BundleManager::resolve`]
    ///
    /// # Errors
    ///
    /// Returns the resolver's error
    pub fn resolve(
        &self,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<ResourceDescriptor<S::Asset>, BundleError> {
        self.lock().resolve(name, resource_type)
    }

    /// See [`BundleManager::load`]
    pub fn load(&self, descriptor: &mut ResourceDescriptor<S::Asset>) -> Option<AssetHandle<S::Asset>> {
        self.lock().load(descriptor)
    }

    /// See [`BundleManager::load_bundle_only`]
    pub fn load_bundle_only(&self, descriptor: &ResourceDescriptor<S::Asset>) -> bool {
        self.lock().load_bundle_only(descriptor)
    }

    /// See [`BundleManager::unload_resource`]
    pub fn unload_resource(&self, descriptor: &ResourceDescriptor<S::Asset>, unload_objects: bool) {
        self.lock().unload_resource(descriptor, unload_objects);
    }

    /// See [`BundleManager::unload_all_resource`]
    pub fn unload_all_resource(&self, descriptor: &ResourceDescriptor<S::Asset>, unload_objects: bool) {
        self.lock().unload_all_resource(descriptor, unload_objects);
    }

    /// Current reference count of a resident bundle
    #[must_use]
    pub fn reference_count(&self, name: &str) -> Option<u32> {
        self.lock().reference_count(name)
    }

    /// Snapshot of the cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.lock().stats()
    }

    /// Dispose every resident bundle
    pub fn shutdown(&self) {
        self.lock().shutdown();
    }

    /// Run several operations under one lock
    pub fn with<R>(&self, f: impl FnOnce(&mut BundleManager<S>) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<S: BundleSource> Clone for SharedBundleManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::storage::MemoryBundleSource;

    #[test]
    fn test_concurrent_load_and_release() {
        let source = MemoryBundleSource::new()
            .with_bundle("base", "base", &[], &[("base", 0_u32)])
            .with_bundle("unit", "unit", &["base"], &[("unit", 1_u32)]);
        let shared = SharedBundleManager::new(BundleManager::new(source));

        thread::scope(|scope| {
            for _ in 0..8 {
                let shared = shared.clone();
                scope.spawn(move || {
                    let mut desc = shared.resolve("unit", ResourceType::default()).unwrap();
                    for _ in 0..50 {
                        assert_eq!(shared.load(&mut desc).and_then(|a| a.get().copied()), Some(1));
                        shared.unload_resource(&desc, false);
                    }
                });
            }
        });

        // Each reload of "unit" retained "base" once more
        let base_refs = shared.reference_count("base").unwrap();
        let unit_opens = shared.with(|m| m.source().open_count("unit")) as u32;
        assert_eq!(base_refs, unit_opens);
        assert_eq!(shared.with(|m| m.source().open_count("base")), 1);
        assert!(shared.reference_count("unit").is_none());

        let stats = shared.stats();
        assert_eq!(stats.cache_hits + stats.cache_misses - u64::from(unit_opens), 400);

        shared.shutdown();
        assert_eq!(shared.with(|m| m.resident_count()), 0);
    }
}
