//! Error types for bucket assignment.

use thiserror::Error;

/// Result type alias for bucket set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate.
///
/// Ownership lookups themselves never fail; these errors come from checked
/// accessors and from building bucket topologies out of configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested bucket is not a member of the set.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// A StatefulSet pod name that is not of the form `<name>-<ordinal>`.
    #[error("invalid stateful set identity: {0:?}")]
    InvalidStatefulSetId(String),

    /// The local ordinal does not fit into the configured bucket count.
    #[error("ordinal {ordinal} is out of range [0, {buckets})")]
    OrdinalOutOfRange { ordinal: usize, buckets: usize },
}
