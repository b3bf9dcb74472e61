//! Dependency-first bundle loading

use super::descriptor::ResourceDescriptor;
use super::registry::BundleRegistry;
use super::source::BundleSource;
use crate::core::{BundleError, CacheStats};

/// Loads a bundle after making every declared dependency resident.
///
/// Borrows the session's registry for the duration of one load.
pub(crate) struct BundleLoader<'a, S: BundleSource> {
    source: &'a S,
    registry: &'a mut BundleRegistry<S::Bundle>,
    stats: &'a mut CacheStats,
    /// Bundles whose load is in progress, outermost first
    chain: Vec<String>,
}

impl<'a, S: BundleSource> BundleLoader<'a, S> {
    pub(crate) fn new(
        source: &'a S,
        registry: &'a mut BundleRegistry<S::Bundle>,
        stats: &'a mut CacheStats,
    ) -> Self {
        Self {
            source,
            registry,
            stats,
            chain: Vec::new(),
        }
    }

    /// Load the dependencies of `descriptor` in declared order, then the bundle
    /// itself, and register it with a reference count of 1.
    ///
    /// Dependencies that cannot be resolved or opened are logged and skipped.
    /// Only a failure of the target bundle itself is returned, in which case
    /// nothing is registered under its name.
    pub(crate) fn load_with_dependencies(
        &mut self,
        descriptor: &ResourceDescriptor<S::Asset>,
    ) -> Result<(), BundleError> {
        self.chain.push(descriptor.name.clone());
        self.load_dependencies(descriptor);
        let result = self.open_and_register(descriptor);
        self.chain.pop();
        result
    }

    fn load_dependencies(&mut self, descriptor: &ResourceDescriptor<S::Asset>) {
        for dependency in &descriptor.dependencies {
            if let Err(e) = self.ensure_dependency(&descriptor.name, dependency) {
                log::error!("Skipping dependency of '{}': {e}", descriptor.name);
            }
        }
    }

    fn ensure_dependency(&mut self, parent: &str, name: &str) -> Result<(), BundleError> {
        if self.registry.lookup_and_retain(name).is_some() {
            self.stats.cache_hits += 1;
            log::debug!("Dependency '{name}' of '{parent}' already resident");
            return Ok(());
        }

        self.check_cycle(name)?;

        let Some(dep) = self.source.resolve_dependency_descriptor(name) else {
            self.stats.resolve_failures += 1;
            return Err(BundleError::UnresolvedDependency {
                name: name.to_string(),
                parent: parent.to_string(),
            });
        };

        // The resolver may normalize the name differently from the declaration
        if dep.name != name {
            if self.registry.lookup_and_retain(&dep.name).is_some() {
                self.stats.cache_hits += 1;
                return Ok(());
            }
            self.check_cycle(&dep.name)?;
        }

        self.load_with_dependencies(&dep)
    }

    fn check_cycle(&self, name: &str) -> Result<(), BundleError> {
        if self.chain.iter().any(|loading| loading == name) {
            return Err(BundleError::DependencyCycle {
                name: name.to_string(),
                chain: self.chain.join(" -> "),
            });
        }
        Ok(())
    }

    fn open_and_register(&mut self, descriptor: &ResourceDescriptor<S::Asset>) -> Result<(), BundleError> {
        self.stats.cache_misses += 1;

        if self.registry.contains(&descriptor.name) {
            let err = BundleError::AlreadyLoaded {
                name: descriptor.name.clone(),
            };
            log::error!("Refusing to open a resident bundle twice: {err}");
            return Err(err);
        }

        if descriptor.path.is_empty() {
            self.stats.open_failures += 1;
            return Err(BundleError::EmptyPath {
                name: descriptor.name.clone(),
            });
        }

        let bundle = self.source.open_bundle(&descriptor.path).inspect_err(|_| {
            self.stats.open_failures += 1;
        })?;
        self.stats.opens += 1;
        log::debug!("Opened bundle '{}' from '{}'", descriptor.name, descriptor.path);

        if let Err((err, rejected)) = self.registry.insert(descriptor.name.clone(), bundle) {
            log::error!("Registry rejected freshly opened bundle: {err}");
            self.source.dispose_bundle(rejected, false);
            return Err(err);
        }
        Ok(())
    }
}
