//! Bundle release and eviction

use std::borrow::Cow;

use super::descriptor::ResourceDescriptor;
use super::registry::{BundleRegistry, Release};
use super::source::BundleSource;
use crate::core::CacheStats;

/// Releases consumer claims on resident bundles and disposes evicted ones
pub(crate) struct BundleUnloader<'a, S: BundleSource> {
    source: &'a S,
    registry: &'a mut BundleRegistry<S::Bundle>,
    stats: &'a mut CacheStats,
}

impl<'a, S: BundleSource> BundleUnloader<'a, S> {
    pub(crate) fn new(
        source: &'a S,
        registry: &'a mut BundleRegistry<S::Bundle>,
        stats: &'a mut CacheStats,
    ) -> Self {
        Self {
            source,
            registry,
            stats,
        }
    }

    /// Release one reference on the descriptor's own bundle. Dependencies are
    /// left alone.
    pub(crate) fn release_own(&mut self, descriptor: &ResourceDescriptor<S::Asset>, unload_objects: bool) {
        self.release(&descriptor.name, unload_objects);
    }

    /// Release one reference on the descriptor's bundle and one on each of its
    /// declared dependencies
    pub(crate) fn release_all(&mut self, descriptor: &ResourceDescriptor<S::Asset>, unload_objects: bool) {
        self.release(&descriptor.name, unload_objects);
        for dependency in &descriptor.dependencies {
            let name = self.registered_name(dependency);
            self.release(&name, unload_objects);
        }
    }

    /// Name a declared dependency is registered under. The loader registers
    /// dependencies under the name the resolver returns, which may differ from
    /// the declaration.
    fn registered_name<'n>(&self, declared: &'n str) -> Cow<'n, str> {
        if self.registry.contains(declared) {
            return Cow::Borrowed(declared);
        }
        match self.source.resolve_dependency_descriptor(declared) {
            Some(dep) => Cow::Owned(dep.name),
            None => Cow::Borrowed(declared),
        }
    }

    /// Release one reference, disposing the bundle if it was the last one.
    /// Returns whether the bundle was evicted.
    pub(crate) fn release(&mut self, name: &str, unload_objects: bool) -> bool {
        match self.registry.release_one(name) {
            Release::NotResident => {
                self.stats.over_releases += 1;
                log::warn!("Release of '{name}' ignored: bundle is not resident");
                false
            }
            Release::Retained(_) => false,
            Release::Evicted(bundle) => {
                self.source.dispose_bundle(bundle, unload_objects);
                self.stats.evictions += 1;
                log::debug!("Evicted bundle '{name}' (unload objects: {unload_objects})");
                true
            }
        }
    }
}
