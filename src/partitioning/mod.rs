//! Partitioning of a key space across named buckets.
//!
//! This module implements consistent hashing for key assignment, ensuring:
//! - Deterministic ownership for a given set of bucket names
//! - Even distribution of keys across buckets
//! - Minimal key movement when buckets join/leave
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BucketSet                             │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                    HashRing                           │  │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐   │  │
//! │  │  │ a:0 │→│ c:7 │→│ b:3 │→│ a:9 │→│ b:1 │→│ c:2 │   │  │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘ └─────┘ └─────┘   │  │
//! │  │      256 virtual nodes per bucket                    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  OwnerCache: "default/foo" → "b", ...                │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                                                             │
//! │  Key "default/foo" → hash → next vnode → bucket "b"        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use bucketset::{BucketSet, NamespacedName};
//!
//! let set = BucketSet::new(["replica-0", "replica-1", "replica-2"]);
//!
//! let owner = set.owner("default/foo").unwrap();
//! assert!(set.has_bucket(&owner));
//!
//! let mine = set.bucket("replica-1").unwrap();
//! if mine.has(&NamespacedName::new("default", "foo")) {
//!     println!("reconcile locally");
//! }
//!
//! // Scale down: cached answers are dropped and recomputed.
//! set.update(["replica-0", "replica-1"]);
//! assert_eq!(set.cache_len(), 0);
//! ```

mod bucket;
mod hashring;

pub use bucket::{Bucket, BucketSet, KeyBucket, UniversalBucket, UNIVERSAL_BUCKET_NAME};
pub use hashring::{HashRing, DEFAULT_VNODES_PER_BUCKET};
