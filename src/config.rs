//! Configuration types for bucket sets and StatefulSet-based sharding.

use crate::error::{Error, Result};

/// Default number of cached owner lookups per bucket set.
pub const DEFAULT_CACHE_CAPACITY: u64 = 4096;

/// Default URL scheme for StatefulSet bucket names.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Default port for StatefulSet bucket names.
pub const DEFAULT_PORT: &str = "80";

/// Default Kubernetes cluster domain.
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

/// Environment variable holding the controller pod name, `<statefulset>-<ordinal>`.
pub const ENV_CONTROLLER_ORDINAL: &str = "STATEFUL_CONTROLLER_ORDINAL";
/// Environment variable holding the governing headless service name.
pub const ENV_SERVICE_NAME: &str = "STATEFUL_SERVICE_NAME";
/// Environment variable overriding the URL scheme.
pub const ENV_SERVICE_PROTOCOL: &str = "STATEFUL_SERVICE_PROTOCOL";
/// Environment variable overriding the service port.
pub const ENV_SERVICE_PORT: &str = "STATEFUL_SERVICE_PORT";
/// Environment variable holding the namespace the controller runs in.
pub const ENV_SYSTEM_NAMESPACE: &str = "SYSTEM_NAMESPACE";
/// Environment variable overriding the cluster domain.
pub const ENV_CLUSTER_DOMAIN: &str = "CLUSTER_DOMAIN";

/// Configuration for a [`BucketSet`](crate::BucketSet).
#[derive(Debug, Clone)]
pub struct BucketSetConfig {
    /// Maximum number of cached owner lookups.
    pub cache_capacity: u64,

    /// Number of points each bucket occupies on the hash ring.
    /// More vnodes = more even distribution but a larger ring.
    pub vnodes_per_bucket: usize,
}

impl Default for BucketSetConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            vnodes_per_bucket: crate::partitioning::DEFAULT_VNODES_PER_BUCKET,
        }
    }
}

impl BucketSetConfig {
    /// Set the owner cache capacity.
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the number of virtual nodes per bucket.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.vnodes_per_bucket = vnodes.max(1);
        self
    }
}

/// Identity of a controller replica running as a StatefulSet pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatefulSetConfig {
    /// StatefulSet name (pod name without the ordinal suffix).
    pub statefulset: String,
    /// Ordinal of the local pod.
    pub ordinal: usize,
    /// Headless service governing the StatefulSet.
    pub service_name: String,
    /// Namespace the StatefulSet runs in.
    pub namespace: String,
    /// URL scheme used in bucket names.
    pub protocol: String,
    /// Port used in bucket names.
    pub port: String,
    /// Cluster DNS suffix.
    pub cluster_domain: String,
}

impl StatefulSetConfig {
    /// Create a config for the given pod identity with default protocol, port
    /// and cluster domain.
    pub fn new(
        statefulset: impl Into<String>,
        ordinal: usize,
        service_name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            statefulset: statefulset.into(),
            ordinal,
            service_name: service_name.into(),
            namespace: namespace.into(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            port: DEFAULT_PORT.to_string(),
            cluster_domain: DEFAULT_CLUSTER_DOMAIN.to_string(),
        }
    }

    /// Load the config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{} is not set", key)))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let (statefulset, ordinal) = parse_statefulset_id(&required(ENV_CONTROLLER_ORDINAL)?)?;

        Ok(Self {
            statefulset,
            ordinal,
            service_name: required(ENV_SERVICE_NAME)?,
            namespace: required(ENV_SYSTEM_NAMESPACE)?,
            protocol: optional(ENV_SERVICE_PROTOCOL, DEFAULT_PROTOCOL),
            port: optional(ENV_SERVICE_PORT, DEFAULT_PORT),
            cluster_domain: optional(ENV_CLUSTER_DOMAIN, DEFAULT_CLUSTER_DOMAIN),
        })
    }

    /// Set the URL scheme.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Set the cluster domain.
    pub fn with_cluster_domain(mut self, domain: impl Into<String>) -> Self {
        self.cluster_domain = domain.into();
        self
    }
}

/// Split a pod name such as `controller-2` into `("controller", 2)`.
pub fn parse_statefulset_id(pod_name: &str) -> Result<(String, usize)> {
    let invalid = || Error::InvalidStatefulSetId(pod_name.to_string());

    let (name, ordinal) = pod_name.rsplit_once('-').ok_or_else(invalid)?;
    if name.is_empty() {
        return Err(invalid());
    }
    let ordinal = ordinal.parse::<usize>().map_err(|_| invalid())?;

    Ok((name.to_string(), ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = BucketSetConfig::default();
        assert_eq!(config.cache_capacity, 4096);
        assert_eq!(config.vnodes_per_bucket, 256);
    }

    #[test]
    fn test_config_builder() {
        let config = BucketSetConfig::default()
            .with_cache_capacity(10)
            .with_vnodes(0);

        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.vnodes_per_bucket, 1);
    }

    #[test]
    fn test_parse_statefulset_id() {
        assert_eq!(
            parse_statefulset_id("autoscaler-2").unwrap(),
            ("autoscaler".to_string(), 2)
        );
        assert_eq!(
            parse_statefulset_id("my-controller-10").unwrap(),
            ("my-controller".to_string(), 10)
        );

        for bad in ["autoscaler", "autoscaler-", "-3", "autoscaler-1a", "autoscaler-x"] {
            assert_eq!(
                parse_statefulset_id(bad),
                Err(Error::InvalidStatefulSetId(bad.to_string())),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_statefulset_from_lookup() {
        let config = StatefulSetConfig::from_lookup(lookup(&[
            (ENV_CONTROLLER_ORDINAL, "autoscaler-1"),
            (ENV_SERVICE_NAME, "autoscaler"),
            (ENV_SYSTEM_NAMESPACE, "knative-serving"),
            (ENV_SERVICE_PORT, "8080"),
        ]))
        .unwrap();

        assert_eq!(config.statefulset, "autoscaler");
        assert_eq!(config.ordinal, 1);
        assert_eq!(config.service_name, "autoscaler");
        assert_eq!(config.namespace, "knative-serving");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.port, "8080");
        assert_eq!(config.cluster_domain, "cluster.local");
    }

    #[test]
    fn test_statefulset_from_lookup_missing() {
        let err = StatefulSetConfig::from_lookup(lookup(&[
            (ENV_CONTROLLER_ORDINAL, "autoscaler-1"),
            (ENV_SYSTEM_NAMESPACE, "knative-serving"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            Error::Config(format!("{} is not set", ENV_SERVICE_NAME))
        );

        let err = StatefulSetConfig::from_lookup(lookup(&[
            (ENV_CONTROLLER_ORDINAL, "autoscaler"),
            (ENV_SERVICE_NAME, "autoscaler"),
            (ENV_SYSTEM_NAMESPACE, "knative-serving"),
        ]))
        .unwrap_err();
        assert_eq!(err, Error::InvalidStatefulSetId("autoscaler".to_string()));
    }
}
