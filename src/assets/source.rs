//! Bundle source capability
//!
//! The storage backend the bundle manager talks to. It resolves logical names
//! to descriptors and opens, reads and disposes bundle handles.

use super::descriptor::{ResourceDescriptor, ResourceType};
use super::handle::AssetHandle;
use crate::core::BundleError;

/// Storage backend for bundles.
///
/// Name normalization (case folding) is the backend's job: every name it
/// returns inside a descriptor is used as-is as a cache key.
pub trait BundleSource {
    /// An opened bundle
    type Bundle;
    /// Objects stored inside a bundle
    type Asset;

    /// Resolve the descriptor for a resource request.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be resolved
    fn resolve_descriptor(
        &self,
        name: &str,
        resource_type: ResourceType,
    ) -> Result<ResourceDescriptor<Self::Asset>, BundleError>;

    /// Resolve the descriptor of a dependency bundle by name
    fn resolve_dependency_descriptor(&self, name: &str) -> Option<ResourceDescriptor<Self::Asset>>;

    /// Open the bundle stored at `path`. Blocks until the bundle is readable.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty path or if the store rejects it
    fn open_bundle(&self, path: &str) -> Result<Self::Bundle, BundleError>;

    /// Pull one named asset out of an opened bundle
    fn extract_asset(&self, bundle: &Self::Bundle, name: &str) -> Option<AssetHandle<Self::Asset>>;

    /// Release the storage behind a bundle. With `unload_objects` every asset
    /// already extracted from it is unloaded, so handles callers still hold
    /// stop resolving.
    fn dispose_bundle(&self, bundle: Self::Bundle, unload_objects: bool);
}
