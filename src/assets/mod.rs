//! Bundle loading and caching
//!
//! Provides a reference-counted bundle cache with:
//! - Dependency-first loading through a pluggable [`BundleSource`]
//! - One resident copy per bundle, shared by every consumer
//! - Eviction and disposal when the last consumer releases a bundle

mod descriptor;
mod extractor;
mod handle;
mod loader;
mod manager;
mod registry;
mod shared;
mod source;
mod unloader;

pub use descriptor::{ResourceDescriptor, ResourceType};
pub use handle::AssetHandle;
pub use manager::BundleManager;
pub use registry::{BundleRegistry, LoadedBundle, Release};
pub use shared::SharedBundleManager;
pub use source::BundleSource;
