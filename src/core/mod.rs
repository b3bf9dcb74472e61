//! Core module
//!
//! Configuration, errors and statistics shared by the bundle system

mod config;
mod error;
mod stats;

pub use config::BundleConfig;
pub use error::BundleError;
pub use stats::CacheStats;
