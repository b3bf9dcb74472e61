//! Resource descriptors
//!
//! A descriptor is resolved fresh for every request and only lives for the
//! duration of a load or unload call.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::handle::AssetHandle;

/// Integer tag used by resolvers to pick the directory of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(pub u32);

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ResourceType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Resolved metadata for one resource request
#[derive(Debug, Clone)]
pub struct ResourceDescriptor<A> {
    /// Case-folded resource name, also the key of its own bundle
    pub name: String,
    /// Type tag the path was resolved with
    pub resource_type: ResourceType,
    /// Normalized physical path of the bundle
    pub path: String,
    /// Bundles that must be resident before this one is opened, in load order
    pub dependencies: Vec<String>,
    /// Asset recorded by the last successful extraction
    pub asset: Option<AssetHandle<A>>,
}

impl<A> ResourceDescriptor<A> {
    /// Create a descriptor with no dependencies
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        resource_type: ResourceType,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_type,
            path: path.into(),
            dependencies: Vec::new(),
            asset: None,
        }
    }

    /// Set the dependency list
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Whether any dependency is declared
    #[must_use]
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}
