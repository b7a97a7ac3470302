//! Caching of ownership lookups.

mod owners;

pub use owners::OwnerCache;
