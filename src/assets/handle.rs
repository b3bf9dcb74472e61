//! Asset handle implementation
//!
//! Handles to objects extracted from a bundle. The bundle keeps one handle per
//! asset; every extraction hands out a clone of it. Disposing the bundle with
//! object unloading marks every clone unloaded.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Global counter for generating unique asset IDs
static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed)
}

/// A shared handle to an asset of type `T` extracted from a bundle.
///
/// Clones share the same id, the same underlying value and the same loaded
/// state.
#[derive(Debug)]
pub struct AssetHandle<T> {
    id: u64,
    name: Arc<str>,
    inner: Arc<T>,
    /// Set once the owning bundle unloads its objects
    unloaded: Arc<AtomicBool>,
}

impl<T> AssetHandle<T> {
    /// Wrap an asset under the name it is stored with in its bundle
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, value: T) -> Self {
        Self::from_shared(name, Arc::new(value))
    }

    /// Create a fresh handle over a value that is already shared.
    ///
    /// The new handle has its own id and loaded state, so unloading it does
    /// not affect other handles to the same value.
    #[must_use]
    pub fn from_shared(name: impl Into<Arc<str>>, inner: Arc<T>) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            inner,
            unloaded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the unique ID of this asset
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Name of the asset inside its bundle
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a reference to the underlying asset, or `None` once it was unloaded
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.is_loaded().then_some(&*self.inner)
    }

    /// Whether the asset is still usable
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.unloaded.load(Ordering::Acquire)
    }

    /// Invalidate this handle and every clone of it
    pub fn unload(&self) {
        self.unloaded.store(true, Ordering::Release);
    }

    /// Number of live handles to this asset, including this one
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            inner: Arc::clone(&self.inner),
            unloaded: Arc::clone(&self.unloaded),
        }
    }
}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
