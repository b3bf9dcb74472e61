//! Error type shared by every bundle operation

use thiserror::Error;

/// Errors that can occur while resolving, opening or tracking bundles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// The resolver has no descriptor for this resource
    #[error("unknown resource '{name}'")]
    UnknownResource {
        /// Requested resource name
        name: String,
    },
    /// A declared dependency could not be resolved to a descriptor
    #[error("dependency '{name}' of '{parent}' could not be resolved")]
    UnresolvedDependency {
        /// Dependency bundle name
        name: String,
        /// Bundle that declared the dependency
        parent: String,
    },
    /// A dependency is already being loaded further up the chain
    #[error("dependency cycle: '{name}' is already being loaded ({chain})")]
    DependencyCycle {
        /// Bundle that closes the cycle
        name: String,
        /// Load chain at the time the cycle was found, joined with " -> "
        chain: String,
    },
    /// The descriptor carries no physical path
    #[error("empty bundle path for '{name}'")]
    EmptyPath {
        /// Bundle name
        name: String,
    },
    /// The bundle store could not open the physical path
    #[error("failed to open bundle at '{path}': {reason}")]
    OpenFailed {
        /// Physical path handed to the store
        path: String,
        /// Store-specific reason
        reason: String,
    },
    /// A bundle with this name is already resident
    #[error("bundle '{name}' is already loaded")]
    AlreadyLoaded {
        /// Bundle name
        name: String,
    },
    /// Asynchronous loading has no implementation
    #[error("asynchronous bundle loading is not implemented")]
    AsyncUnsupported,
    /// IO error reading a config or catalog file
    #[error("IO error: {0}")]
    Io(String),
    /// Error parsing a config, catalog or archive
    #[error("parse error: {0}")]
    Parse(String),
}
