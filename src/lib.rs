//! Reference-counted asset bundle cache
//!
//! This crate provides:
//! - Dependency-first, load-once bundle loading
//! - Per-bundle reference counting with eviction on last release
//! - Filesystem and in-memory bundle sources
//! - RON/JSON configuration and a RON bundle catalog

pub mod assets;
pub mod core;
pub mod storage;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::{
        AssetHandle, BundleManager, BundleSource, ResourceDescriptor, ResourceType,
        SharedBundleManager,
    };
    pub use crate::core::{BundleConfig, BundleError, CacheStats};
    pub use crate::storage::{BundleArchive, BundleCatalog, FsBundleSource, MemoryBundleSource};
}
