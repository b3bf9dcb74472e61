//! Loaded bundle registry
//!
//! Owns every resident bundle handle together with its reference count.

use rustc_hash::FxHashMap;

use crate::core::BundleError;

/// A resident bundle and the number of consumers holding it
#[derive(Debug)]
pub struct LoadedBundle<B> {
    name: String,
    handle: B,
    reference_count: u32,
}

impl<B> LoadedBundle<B> {
    /// Name the bundle was loaded under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The opened bundle
    #[must_use]
    pub fn handle(&self) -> &B {
        &self.handle
    }

    /// Number of consumers currently holding this bundle, always at least 1
    #[must_use]
    pub const fn reference_count(&self) -> u32 {
        self.reference_count
    }
}

/// Result of releasing one reference
#[derive(Debug)]
pub enum Release<B> {
    /// No bundle with that name is resident
    NotResident,
    /// The bundle stays resident with the given remaining count
    Retained(u32),
    /// The last reference was released; the caller must dispose the handle
    Evicted(B),
}

impl<B> Release<B> {
    /// Whether the release removed the bundle
    #[must_use]
    pub const fn is_evicted(&self) -> bool {
        matches!(self, Self::Evicted(_))
    }
}

/// Mapping from bundle name to resident bundle.
///
/// A count never reaches zero while the entry is stored: the decrement that
/// would make it zero removes the entry instead.
#[derive(Debug)]
pub struct BundleRegistry<B> {
    bundles: FxHashMap<String, LoadedBundle<B>>,
}

impl<B> BundleRegistry<B> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: FxHashMap::default(),
        }
    }

    /// Take one more reference on a resident bundle.
    ///
    /// Returns `None` without side effects if the bundle is not resident.
    pub fn lookup_and_retain(&mut self, name: &str) -> Option<&B> {
        let entry = self.bundles.get_mut(name)?;
        entry.reference_count += 1;
        log::trace!("Retained bundle '{}' (refs: {})", name, entry.reference_count);
        Some(&entry.handle)
    }

    /// Register a freshly opened bundle with a reference count of 1.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyLoaded` if a bundle with that name is resident. This is
    /// a logic error in the caller, which must check residency first; the
    /// rejected handle is handed back so it can be disposed.
    pub fn insert(&mut self, name: impl Into<String>, handle: B) -> Result<&B, (BundleError, B)> {
        let name = name.into();
        if self.bundles.contains_key(&name) {
            return Err((BundleError::AlreadyLoaded { name }, handle));
        }

        let entry = self.bundles.entry(name.clone()).or_insert(LoadedBundle {
            name,
            handle,
            reference_count: 1,
        });
        Ok(&entry.handle)
    }

    /// Release one reference on the named bundle
    pub fn release_one(&mut self, name: &str) -> Release<B> {
        let Some(entry) = self.bundles.get_mut(name) else {
            return Release::NotResident;
        };

        if entry.reference_count > 1 {
            entry.reference_count -= 1;
            log::trace!("Released bundle '{}' (refs: {})", name, entry.reference_count);
            return Release::Retained(entry.reference_count);
        }

        match self.bundles.remove(name) {
            Some(entry) => Release::Evicted(entry.handle),
            None => Release::NotResident,
        }
    }

    /// Look at a resident bundle without touching its count
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LoadedBundle<B>> {
        self.bundles.get(name)
    }

    /// Check if a bundle is resident
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Reference count of a resident bundle
    #[must_use]
    pub fn reference_count(&self, name: &str) -> Option<u32> {
        self.bundles.get(name).map(LoadedBundle::reference_count)
    }

    /// Number of resident bundles
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Check if no bundle is resident
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Names of all resident bundles, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Remove every bundle regardless of its count, handing back the handles
    pub fn drain(&mut self) -> impl Iterator<Item = (String, B)> + '_ {
        self.bundles.drain().map(|(name, entry)| (name, entry.handle))
    }
}

impl<B> Default for BundleRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_retain() {
        let mut registry = BundleRegistry::new();
        assert!(registry.lookup_and_retain("ui").is_none());
        assert!(registry.is_empty());

        registry.insert("ui", 7_u32).unwrap();
        assert_eq!(registry.reference_count("ui"), Some(1));

        assert_eq!(registry.lookup_and_retain("ui"), Some(&7));
        assert_eq!(registry.reference_count("ui"), Some(2));
        assert_eq!(registry.get("ui").unwrap().name(), "ui");
    }

    #[test]
    fn test_lookup_miss_has_no_side_effect() {
        let mut registry: BundleRegistry<u32> = BundleRegistry::new();
        assert!(registry.lookup_and_retain("missing").is_none());
        assert!(!registry.contains("missing"));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_double_insert_is_rejected() {
        let mut registry = BundleRegistry::new();
        registry.insert("ui", 1_u32).unwrap();

        let (err, rejected) = registry.insert("ui", 2_u32).unwrap_err();
        assert_eq!(err, BundleError::AlreadyLoaded { name: "ui".to_string() });
        assert_eq!(rejected, 2);
        assert_eq!(registry.get("ui").unwrap().handle(), &1);
        assert_eq!(registry.reference_count("ui"), Some(1));
    }

    #[test]
    fn test_release_to_zero_evicts() {
        let mut registry = BundleRegistry::new();
        registry.insert("ui", 5_u32).unwrap();
        registry.lookup_and_retain("ui");

        assert!(matches!(registry.release_one("ui"), Release::Retained(1)));
        assert!(registry.contains("ui"));

        let release = registry.release_one("ui");
        assert!(release.is_evicted());
        assert!(matches!(release, Release::Evicted(5)));
        assert!(!registry.contains("ui"));
    }

    #[test]
    fn test_over_release_is_noop() {
        let mut registry = BundleRegistry::new();
        registry.insert("ui", 5_u32).unwrap();
        registry.release_one("ui");

        assert!(matches!(registry.release_one("ui"), Release::NotResident));
        assert!(matches!(registry.release_one("never"), Release::NotResident));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_and_drain() {
        let mut registry = BundleRegistry::new();
        registry.insert("b", 2_u32).unwrap();
        registry.insert("a", 1_u32).unwrap();
        registry.lookup_and_retain("a");

        assert_eq!(registry.names(), vec!["a", "b"]);

        let mut drained: Vec<(String, u32)> = registry.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
        assert!(registry.is_empty());
    }
}
