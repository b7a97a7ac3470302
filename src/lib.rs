//! Consistent-hash bucket assignment for sharded controllers.
//!
//! This crate deterministically assigns keys (typically `namespace/name`
//! resource keys) to one of a named, resizable set of buckets (controller
//! replicas or shards). It provides:
//! - A **consistent hash ring** with virtual nodes for stable, even assignment
//! - A **Moka** cache of resolved owners for the lookup hot path
//! - **Atomic membership updates** that invalidate the cache with the topology
//!
//! # Example
//!
//! ```rust
//! use bucketset::{BucketSet, NamespacedName};
//!
//! // Bucket names usually come from replica identities.
//! let set = BucketSet::new(["ctrl-0", "ctrl-1", "ctrl-2"]);
//!
//! // Which replica reconciles this resource?
//! let key = NamespacedName::new("default", "my-service");
//! let owner = set.owner(&key.to_string()).unwrap();
//!
//! // Same answer from the owner's own bucket handle.
//! assert!(set.bucket(&owner)?.has(&key));
//!
//! // A replica went away.
//! set.update(["ctrl-0", "ctrl-1"]);
//! assert_eq!(set.bucket_list(), vec!["ctrl-0", "ctrl-1"]);
//! # Ok::<(), bucketset::Error>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │       Controller (informers, queues)         │
//! └─────────────────────────────────────────────┘
//!        │ names changed           │ owner(key) / has(key)
//!        ▼                         ▼
//! ┌─────────────────────────────────────────────┐
//! │                 BucketSet                    │
//! │  • update(names)                            │
//! │  • owner(key) -> Option<name>               │
//! │  • buckets() -> [Bucket]                    │
//! └─────────────────────────────────────────────┘
//!          │                        │
//!          ▼                        ▼
//!    ┌──────────┐            ┌────────────┐
//!    │ HashRing │            │ OwnerCache │
//!    └──────────┘            └────────────┘
//! ```
//!
//! # Consistency Model
//!
//! - **Lookups**: a pure function of the key and the current bucket names
//! - **Updates**: ring and cache are swapped under one write lock; a lookup
//!   sees either the old topology or the new one, never a mix

pub mod cache;
pub mod config;
pub mod error;
pub mod naming;
pub mod partitioning;
pub mod types;

// Re-export main types for convenience
pub use config::{BucketSetConfig, StatefulSetConfig};
pub use error::{Error, Result};
pub use types::{BucketSetStats, NamespacedName};

// Re-export partitioning types
pub use partitioning::{
    Bucket, BucketSet, HashRing, KeyBucket, UniversalBucket, DEFAULT_VNODES_PER_BUCKET,
    UNIVERSAL_BUCKET_NAME,
};

// Re-export naming helpers
pub use naming::{standard_bucket_names, statefulset_pod_dns, StatefulSetBuckets};
