//! Bundle storage backends
//!
//! - `FsBundleSource`: RON bundle archives on disk, described by a catalog
//! - `MemoryBundleSource`: bundles registered in memory, with open/dispose tracking

mod archive;
mod catalog;
mod fs;
mod memory;

pub use archive::BundleArchive;
pub use catalog::{BundleCatalog, CatalogEntry};
pub use fs::{FsBundle, FsBundleSource};
pub use memory::{MemoryBundle, MemoryBundleSource};
