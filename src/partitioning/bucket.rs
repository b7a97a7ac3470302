//! Bucket sets and bucket handles.
//!
//! A [`BucketSet`] owns the current universe of bucket names together with a
//! cache of resolved owners, and a [`Bucket`] is a cheap named view into it
//! answering "is this key mine".

use crate::cache::OwnerCache;
use crate::config::BucketSetConfig;
use crate::error::{Error, Result};
use crate::partitioning::hashring::HashRing;
use crate::types::{BucketSetStats, NamespacedName};
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Something that can decide whether it is responsible for a resource.
pub trait KeyBucket {
    /// Name of the bucket.
    fn name(&self) -> &str;

    /// Whether this bucket owns the given resource.
    fn has(&self, key: &NamespacedName) -> bool;
}

/// Ring and cache, guarded together so lookups never see one without the other.
struct Topology {
    ring: HashRing,
    cache: OwnerCache,
}

/// The universe of buckets plus a cache of key ownership.
///
/// Ownership is a deterministic function of the key and the current set of
/// bucket names. Lookups are cached; [`update`](Self::update) swaps in a new
/// set of names and drops every cached answer in the same critical section.
pub struct BucketSet {
    topology: RwLock<Topology>,
    config: BucketSetConfig,
}

impl BucketSet {
    /// Create a bucket set with the default configuration.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(names, BucketSetConfig::default())
    }

    /// Create a bucket set with a custom configuration.
    pub fn with_config<I, S>(names: I, config: BucketSetConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ring = HashRing::from_buckets(config.vnodes_per_bucket, names);
        tracing::debug!(
            buckets = ring.bucket_count(),
            cache_capacity = config.cache_capacity,
            "Created bucket set"
        );

        Self {
            topology: RwLock::new(Topology {
                ring,
                cache: OwnerCache::new(config.cache_capacity),
            }),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BucketSetConfig {
        &self.config
    }

    /// Get the bucket that owns `key`.
    ///
    /// Results are cached until the next [`update`](Self::update). Returns
    /// None only when the set is empty.
    pub fn owner(&self, key: &str) -> Option<String> {
        let topology = self.topology.read();

        if let Some(owner) = topology.cache.get(key) {
            return Some(owner);
        }

        let owner = topology.ring.owner(key.as_bytes())?.to_string();
        tracing::trace!(key, owner = %owner, "Resolved bucket owner");
        // Inserting under the read lock keeps the entry from outliving an
        // update that is waiting for the write lock.
        topology.cache.insert(key.to_string(), owner.clone());
        Some(owner)
    }

    /// Get up to `count` distinct buckets for `key`, owner first.
    ///
    /// Not cached.
    pub fn owners(&self, key: &str, count: usize) -> Vec<String> {
        self.topology
            .read()
            .ring
            .owners(key.as_bytes(), count)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Replace the universe of buckets.
    ///
    /// Every cached owner is dropped in the same critical section, so lookups
    /// that follow only ever see owners from `names`.
    pub fn update<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ring = HashRing::from_buckets(self.config.vnodes_per_bucket, names);

        let mut topology = self.topology.write();
        let added: Vec<&String> = ring.buckets().difference(topology.ring.buckets()).collect();
        let removed: Vec<&String> = topology.ring.buckets().difference(ring.buckets()).collect();
        tracing::info!(
            buckets = ring.bucket_count(),
            ?added,
            ?removed,
            "Updated bucket set"
        );

        topology.cache.purge();
        topology.ring = ring;
    }

    /// Get a handle for every bucket, ordered by name.
    pub fn buckets(&self) -> Vec<Bucket<'_>> {
        self.bucket_list()
            .into_iter()
            .map(|name| Bucket::new(name, self))
            .collect()
    }

    /// Get every bucket name in sorted order.
    pub fn bucket_list(&self) -> Vec<String> {
        self.topology.read().ring.buckets().iter().cloned().collect()
    }

    /// Get the bucket names as a set.
    pub fn bucket_names(&self) -> BTreeSet<String> {
        self.topology.read().ring.buckets().clone()
    }

    /// Check if a bucket is part of the set.
    pub fn has_bucket(&self, name: &str) -> bool {
        self.topology.read().ring.contains_bucket(name)
    }

    /// Get a handle for a bucket known to be in the set.
    pub fn bucket(&self, name: &str) -> Result<Bucket<'_>> {
        if self.has_bucket(name) {
            Ok(Bucket::new(name, self))
        } else {
            Err(Error::BucketNotFound(name.to_string()))
        }
    }

    /// Get the number of buckets.
    pub fn len(&self) -> usize {
        self.topology.read().ring.bucket_count()
    }

    /// Check if the set has no buckets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the exact number of cached owner lookups.
    pub fn cache_len(&self) -> u64 {
        self.topology.read().cache.entry_count()
    }

    /// Get statistics for this set.
    pub fn stats(&self) -> BucketSetStats {
        let topology = self.topology.read();
        BucketSetStats {
            buckets: topology.ring.bucket_count(),
            cached_entries: topology.cache.entry_count(),
            hits: topology.cache.hits(),
            misses: topology.cache.misses(),
            purges: topology.cache.purges(),
        }
    }
}

impl std::fmt::Debug for BucketSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketSet")
            .field("buckets", &self.bucket_list())
            .field("config", &self.config)
            .finish()
    }
}

/// A named member of a [`BucketSet`].
///
/// Holds no state of its own; ownership questions are delegated to the set.
#[derive(Clone)]
pub struct Bucket<'a> {
    name: String,
    set: &'a BucketSet,
}

impl<'a> Bucket<'a> {
    /// Create a handle for `name` in `set`.
    ///
    /// The caller must make sure `name` is a member of `set`; use
    /// [`BucketSet::bucket`] for a checked lookup.
    pub fn new(name: impl Into<String>, set: &'a BucketSet) -> Self {
        Self {
            name: name.into(),
            set,
        }
    }

    /// Get the bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the set this bucket belongs to.
    pub fn set(&self) -> &'a BucketSet {
        self.set
    }

    /// Whether this bucket owns the given resource.
    pub fn has(&self, key: &NamespacedName) -> bool {
        self.has_key(&key.to_string())
    }

    /// Whether this bucket owns a raw string key.
    pub fn has_key(&self, key: &str) -> bool {
        self.set.owner(key).as_deref() == Some(self.name.as_str())
    }
}

impl KeyBucket for Bucket<'_> {
    fn name(&self) -> &str {
        Bucket::name(self)
    }

    fn has(&self, key: &NamespacedName) -> bool {
        Bucket::has(self, key)
    }
}

impl std::fmt::Debug for Bucket<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket").field("name", &self.name).finish()
    }
}

impl PartialEq for Bucket<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::eq(self.set, other.set)
    }
}

impl Eq for Bucket<'_> {}

/// A bucket that owns every key, for running without sharding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniversalBucket;

/// Name reported by [`UniversalBucket`].
pub const UNIVERSAL_BUCKET_NAME: &str = "universal";

impl KeyBucket for UniversalBucket {
    fn name(&self) -> &str {
        UNIVERSAL_BUCKET_NAME
    }

    fn has(&self, _key: &NamespacedName) -> bool {
        true
    }
}
