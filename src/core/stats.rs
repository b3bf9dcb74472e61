//! Cache statistics

use std::fmt;

/// Counters describing how a bundle session has used its cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Bundles opened from the store
    pub opens: u64,
    /// Requests served by an already resident bundle
    pub cache_hits: u64,
    /// Requests that had to open the bundle
    pub cache_misses: u64,
    /// Bundles disposed after their last release
    pub evictions: u64,
    /// Opens rejected by the store
    pub open_failures: u64,
    /// Descriptors or dependencies that could not be resolved
    pub resolve_failures: u64,
    /// Assets missing from an otherwise loaded bundle
    pub extract_failures: u64,
    /// Releases of names with no resident bundle
    pub over_releases: u64,
}

impl CacheStats {
    /// Create zeroed stats
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of requests served from the cache, 0.0 when nothing was requested
    #[must_use]
    pub fn hit_ratio(&self) -> f32 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f32 / total as f32
        }
    }

    /// Reset every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Write the summary to the log at info level
    pub fn log_summary(&self) {
        log::info!("Bundle cache: {self}");
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opens: {} | hits: {} | misses: {} ({:.0}% hit) | evictions: {} | failures: open {}, resolve {}, extract {} | over-releases: {}",
            self.opens,
            self.cache_hits,
            self.cache_misses,
            self.hit_ratio() * 100.0,
            self.evictions,
            self.open_failures,
            self.resolve_failures,
            self.extract_failures,
            self.over_releases
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let mut stats = CacheStats::new();
        assert_eq!(stats.hit_ratio(), 0.0);

        stats.cache_hits = 3;
        stats.cache_misses = 1;
        assert!((stats.hit_ratio() - 0.75).abs() < f32::EPSILON);

        stats.reset();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_display() {
        let stats = CacheStats {
            opens: 2,
            cache_hits: 1,
            cache_misses: 1,
            ..CacheStats::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("opens: 2"));
        assert!(text.contains("50% hit"));
    }
}
