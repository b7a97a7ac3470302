//! Consistent hashing over named buckets with virtual nodes.
//!
//! Every bucket is placed on a 64-bit ring at `vnodes_per_bucket` positions.
//! A key belongs to the bucket owning the first position at or after the
//! key's own hash, wrapping around at the end of the ring. Removing a bucket
//! therefore only moves the keys that bucket owned.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Number of virtual nodes per bucket.
/// More vnodes = more even distribution but higher memory usage.
pub const DEFAULT_VNODES_PER_BUCKET: usize = 256;

/// A consistent hash ring for distributing keys across buckets.
#[derive(Debug, Clone)]
pub struct HashRing {
    /// Ring positions mapped to their owning bucket name.
    vnodes: BTreeMap<u64, String>,

    /// Number of virtual nodes per bucket.
    vnodes_per_bucket: usize,

    /// Bucket names, sorted.
    buckets: BTreeSet<String>,
}

impl HashRing {
    /// Create a new empty hash ring.
    pub fn new() -> Self {
        Self::with_vnodes(DEFAULT_VNODES_PER_BUCKET)
    }

    /// Create a new empty hash ring with a custom vnode count.
    pub fn with_vnodes(vnodes_per_bucket: usize) -> Self {
        Self {
            vnodes: BTreeMap::new(),
            vnodes_per_bucket: vnodes_per_bucket.max(1),
            buckets: BTreeSet::new(),
        }
    }

    /// Build a ring holding every name yielded by `names`.
    ///
    /// Names are placed in sorted order, so two rings built from the same
    /// names are identical regardless of input order.
    pub fn from_buckets<I, S>(vnodes_per_bucket: usize, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ring = Self::with_vnodes(vnodes_per_bucket);
        let sorted: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        for name in sorted {
            ring.add_bucket(name);
        }
        ring
    }

    /// Get the number of virtual nodes per bucket.
    pub fn vnodes_per_bucket(&self) -> usize {
        self.vnodes_per_bucket
    }

    /// Get the number of buckets in the ring.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Get all bucket names in sorted order.
    pub fn buckets(&self) -> &BTreeSet<String> {
        &self.buckets
    }

    /// Check if a bucket is in the ring.
    pub fn contains_bucket(&self, name: &str) -> bool {
        self.buckets.contains(name)
    }

    /// Add a bucket to the ring.
    ///
    /// A position already held by another bucket stays with that bucket.
    pub fn add_bucket(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.buckets.contains(&name) {
            return;
        }

        for i in 0..self.vnodes_per_bucket {
            let position = Self::hash_key(Self::vnode_key(&name, i).as_bytes());
            self.vnodes.entry(position).or_insert_with(|| name.clone());
        }
        self.buckets.insert(name);
    }

    /// Remove a bucket from the ring.
    pub fn remove_bucket(&mut self, name: &str) {
        if !self.buckets.remove(name) {
            return;
        }

        self.vnodes.retain(|_, owner| owner.as_str() != name);
    }

    /// Get the owning bucket for a key.
    ///
    /// Returns None if the ring is empty.
    pub fn owner(&self, key: &[u8]) -> Option<&str> {
        self.owner_at_position(Self::hash_key(key))
    }

    /// Get up to `count` distinct buckets for a key, in ring order.
    ///
    /// The first bucket is the owner; the rest are the buckets a replica of
    /// the key would land on.
    pub fn owners(&self, key: &[u8], count: usize) -> Vec<&str> {
        if self.vnodes.is_empty() || count == 0 {
            return Vec::new();
        }

        let hash = Self::hash_key(key);
        let wanted = count.min(self.buckets.len());
        let mut owners: Vec<&str> = Vec::with_capacity(wanted);

        // Walk clockwise from the key, wrapping once.
        let iter = self.vnodes.range(hash..).chain(self.vnodes.range(..hash));

        for (_, name) in iter {
            if !owners.contains(&name.as_str()) {
                owners.push(name);
                if owners.len() >= wanted {
                    break;
                }
            }
        }

        owners
    }

    /// Get the bucket that owns a specific position on the ring.
    fn owner_at_position(&self, hash: u64) -> Option<&str> {
        self.vnodes
            .range(hash..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .map(|(_, name)| name.as_str())
    }

    /// Get the distribution of keys across buckets for a sample.
    ///
    /// This is useful for testing/monitoring key distribution.
    pub fn distribution(&self, sample_size: usize) -> HashMap<String, usize> {
        let mut distribution = HashMap::new();

        for i in 0..sample_size {
            let key = format!("sample_key_{}", i);
            if let Some(owner) = self.owner(key.as_bytes()) {
                *distribution.entry(owner.to_string()).or_insert(0) += 1;
            }
        }

        distribution
    }

    fn vnode_key(name: &str, index: usize) -> String {
        format!("{}:{}", name, index)
    }

    /// Calculate the hash of a key using xxHash64.
    ///
    /// The raw bytes are fed without a length prefix so positions only depend
    /// on the key contents and stay identical across platforms and releases.
    fn hash_key(key: &[u8]) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(key);
        hasher.finish()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> HashRing {
        HashRing::from_buckets(
            DEFAULT_VNODES_PER_BUCKET,
            ["monsoon", "chubasco", "aguacero", "chaparrón"],
        )
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new();
        assert_eq!(ring.bucket_count(), 0);
        assert!(ring.owner(b"key").is_none());
        assert!(ring.owners(b"key", 3).is_empty());
    }

    #[test]
    fn test_single_bucket() {
        let ring = HashRing::from_buckets(DEFAULT_VNODES_PER_BUCKET, ["solo"]);

        assert_eq!(ring.bucket_count(), 1);
        assert_eq!(ring.owner(b"key"), Some("solo"));
        assert_eq!(ring.owners(b"key", 3), vec!["solo"]);
    }

    #[test]
    fn test_known_owners() {
        let ring = weather();

        assert_eq!(ring.owner(b"hagel"), Some("chaparr\u{f3}n"));
        assert_eq!(ring.owner(b"hail"), Some("chubasco"));
        assert_eq!(ring.owner(b"snow/hail"), Some("chaparr\u{f3}n"));
        assert_eq!(ring.owner(b"sleet"), Some("monsoon"));
        assert_eq!(ring.owner(b"hail/snow"), Some("aguacero"));
    }

    #[test]
    fn test_input_order_irrelevant() {
        let a = weather();
        let b = HashRing::from_buckets(
            DEFAULT_VNODES_PER_BUCKET,
            ["chaparrón", "aguacero", "monsoon", "chubasco", "monsoon"],
        );

        assert_eq!(b.bucket_count(), 4);
        for i in 0..500 {
            let key = format!("ns/name-{}", i);
            assert_eq!(a.owner(key.as_bytes()), b.owner(key.as_bytes()));
        }
    }

    #[test]
    fn test_owners() {
        let ring = weather();

        let owners = ring.owners(b"hagel", 2);
        assert_eq!(owners.len(), 2);
        assert_eq!(owners[0], "chaparr\u{f3}n");
        assert_ne!(owners[0], owners[1]);

        let all = ring.owners(b"hagel", 10);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], "chaparr\u{f3}n");
    }

    #[test]
    fn test_add_remove_bucket() {
        let mut ring = HashRing::from_buckets(16, ["a", "b"]);

        assert_eq!(ring.bucket_count(), 2);
        assert!(ring.contains_bucket("a"));
        assert!(ring.contains_bucket("b"));

        ring.remove_bucket("a");

        assert_eq!(ring.bucket_count(), 1);
        assert!(!ring.contains_bucket("a"));
        // All keys should now go to b
        assert_eq!(ring.owner(b"key"), Some("b"));

        ring.remove_bucket("missing");
        ring.add_bucket("b");
        assert_eq!(ring.bucket_count(), 1);
    }

    #[test]
    fn test_remove_only_moves_removed_keys() {
        let before = weather();
        let mut after = before.clone();
        after.remove_bucket("chubasco");

        for i in 0..2000 {
            let key = format!("default/resource-{}", i);
            let old = before.owner(key.as_bytes()).unwrap();
            let new = after.owner(key.as_bytes()).unwrap();
            if old == "chubasco" {
                assert_ne!(new, "chubasco");
            } else {
                assert_eq!(old, new, "key {} moved", key);
            }
        }
    }

    #[test]
    fn test_add_only_takes_keys() {
        let before = weather();
        let mut after = before.clone();
        after.add_bucket("granizo");

        for i in 0..2000 {
            let key = format!("default/resource-{}", i);
            let old = before.owner(key.as_bytes()).unwrap();
            let new = after.owner(key.as_bytes()).unwrap();
            assert!(new == old || new == "granizo");
        }
    }

    #[test]
    fn test_distribution() {
        let ring = weather();

        let distribution = ring.distribution(10000);

        // Each bucket should have roughly 1/4 of keys (with some variance)
        for name in ring.buckets() {
            let count = distribution.get(name).copied().unwrap_or(0);
            assert!(count > 1750 && count < 3250, "Bucket {} has {} keys", name, count);
        }
    }
}
