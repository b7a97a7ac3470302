//! Core types shared by the bucket set and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a namespaced Kubernetes resource.
///
/// Used as the ownership key; its string form is `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespacedName {
    /// Resource namespace.
    pub namespace: String,
    /// Resource name.
    pub name: String,
}

impl NamespacedName {
    /// Create a new namespaced name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Bucket set statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketSetStats {
    /// Number of buckets in the current topology.
    pub buckets: usize,
    /// Number of cached owner lookups.
    pub cached_entries: u64,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to consult the hash ring.
    pub misses: u64,
    /// Number of times the cache was dropped by a topology update.
    pub purges: u64,
}

impl BucketSetStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_name_display() {
        let nn = NamespacedName::new("snow", "hail");
        assert_eq!(nn.to_string(), "snow/hail");

        let cluster_scoped = NamespacedName::new("", "node-1");
        assert_eq!(cluster_scoped.to_string(), "/node-1");
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(BucketSetStats::default().hit_rate(), 0.0);

        let stats = BucketSetStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
