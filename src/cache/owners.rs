//! Moka cache of resolved key owners.

use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded cache mapping keys to the bucket that owns them.
///
/// The cache itself is thread safe; callers are responsible for keeping it
/// consistent with the topology it was filled from (see [`purge`](Self::purge)).
pub struct OwnerCache {
    /// The underlying Moka cache.
    cache: Cache<String, String>,

    /// Capacity used when the cache is rebuilt.
    capacity: u64,

    /// Hit counter for statistics.
    hits: AtomicU64,

    /// Miss counter for statistics.
    misses: AtomicU64,

    /// Number of purges.
    purges: AtomicU64,
}

impl OwnerCache {
    /// Create a new owner cache holding at most `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Self::build(capacity),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            purges: AtomicU64::new(0),
        }
    }

    fn build(capacity: u64) -> Cache<String, String> {
        Cache::builder().max_capacity(capacity).build()
    }

    /// Get the cached owner of a key.
    pub fn get(&self, key: &str) -> Option<String> {
        let result = self.cache.get(key);

        if result.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        result
    }

    /// Check if a key has a cached owner without touching statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Remember the owner of a key.
    pub fn insert(&self, key: String, owner: String) {
        self.cache.insert(key, owner);
    }

    /// Drop every cached owner.
    ///
    /// The Moka cache is replaced rather than invalidated so the entry count
    /// drops to zero immediately instead of after the next maintenance run.
    pub fn purge(&mut self) {
        self.cache = Self::build(self.capacity);
        self.purges.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the exact number of cached owners.
    ///
    /// Flushes pending Moka maintenance first, so this is more expensive than
    /// a plain read and belongs in diagnostics and tests rather than hot paths.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Get the configured capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that missed the cache.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of purges since creation.
    pub fn purges(&self) -> u64 {
        self.purges.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OwnerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerCache")
            .field("capacity", &self.capacity)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = OwnerCache::new(100);

        assert_eq!(cache.get("key1"), None);
        cache.insert("key1".to_string(), "bucket-a".to_string());

        assert_eq!(cache.get("key1"), Some("bucket-a".to_string()));
        assert!(cache.contains("key1"));
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn test_stats() {
        let cache = OwnerCache::new(100);
        cache.insert("key1".to_string(), "bucket-a".to_string());

        // Hit
        let _ = cache.get("key1");
        // Miss
        let _ = cache.get("nonexistent");
        // Not counted
        let _ = cache.contains("key1");

        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_purge() {
        let mut cache = OwnerCache::new(100);
        cache.insert("key1".to_string(), "bucket-a".to_string());
        cache.insert("key2".to_string(), "bucket-b".to_string());
        let _ = cache.get("key1");
        assert_eq!(cache.entry_count(), 2);

        cache.purge();

        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.purges(), 1);
        assert_eq!(cache.capacity(), 100);
        // Counters survive the purge.
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_bounded() {
        let cache = OwnerCache::new(16);
        for i in 0..100 {
            cache.insert(format!("key-{}", i), "bucket-a".to_string());
        }

        assert!(cache.entry_count() <= 16);
    }
}
