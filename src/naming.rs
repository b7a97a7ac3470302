//! Bucket naming schemes.
//!
//! Bucket names are opaque to [`BucketSet`], but every replica of a controller
//! must derive the same names to agree on ownership. Two schemes are provided:
//!
//! - **Standard**: `{component}.{queue}.{i:02}-of-{count:02}`, for leader
//!   election where each bucket is backed by its own lease.
//! - **StatefulSet**: one bucket per pod, named after the pod's stable DNS
//!   address so peers can forward work to the owner directly.

use crate::config::{BucketSetConfig, StatefulSetConfig};
use crate::error::{Error, Result};
use crate::partitioning::{Bucket, BucketSet};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Names for `count` buckets of `queue` in `component`.
pub fn standard_bucket_names(component: &str, queue: &str, count: usize) -> BTreeSet<String> {
    (0..count)
        .map(|i| format!("{}.{}.{:02}-of-{:02}", component, queue, i, count))
        .collect()
}

/// Stable DNS address of the StatefulSet pod with the given ordinal.
pub fn statefulset_pod_dns(config: &StatefulSetConfig, ordinal: usize) -> String {
    format!(
        "{}://{}-{}.{}.{}.svc.{}:{}",
        config.protocol,
        config.statefulset,
        ordinal,
        config.service_name,
        config.namespace,
        config.cluster_domain,
        config.port
    )
}

/// A bucket set with one bucket per StatefulSet pod, plus the local pod's bucket.
#[derive(Debug, Clone)]
pub struct StatefulSetBuckets {
    set: Arc<BucketSet>,
    local: String,
    config: StatefulSetConfig,
}

impl StatefulSetBuckets {
    /// Build the buckets for a StatefulSet with `buckets` replicas.
    pub fn new(config: StatefulSetConfig, buckets: usize) -> Result<Self> {
        Self::with_set_config(config, buckets, BucketSetConfig::default())
    }

    /// Build the buckets with a custom bucket set configuration.
    pub fn with_set_config(
        config: StatefulSetConfig,
        buckets: usize,
        set_config: BucketSetConfig,
    ) -> Result<Self> {
        if buckets == 0 {
            return Err(Error::Config("bucket count must be positive".to_string()));
        }
        if config.ordinal >= buckets {
            return Err(Error::OrdinalOutOfRange {
                ordinal: config.ordinal,
                buckets,
            });
        }

        let names: Vec<String> = (0..buckets)
            .map(|ordinal| statefulset_pod_dns(&config, ordinal))
            .collect();
        let local = statefulset_pod_dns(&config, config.ordinal);

        tracing::info!(
            statefulset = %config.statefulset,
            ordinal = config.ordinal,
            buckets,
            local = %local,
            "Built StatefulSet buckets"
        );

        Ok(Self {
            set: Arc::new(BucketSet::with_config(names, set_config)),
            local,
            config,
        })
    }

    /// Build the buckets from the process environment.
    pub fn from_env(buckets: usize) -> Result<Self> {
        Self::new(StatefulSetConfig::from_env()?, buckets)
    }

    /// Get the shared bucket set.
    pub fn set(&self) -> &Arc<BucketSet> {
        &self.set
    }

    /// Get the StatefulSet identity these buckets were built from.
    pub fn config(&self) -> &StatefulSetConfig {
        &self.config
    }

    /// Get the name of the local pod's bucket.
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Get the local pod's bucket.
    pub fn local_bucket(&self) -> Bucket<'_> {
        Bucket::new(self.local.as_str(), &self.set)
    }
}
