//! Cluster API capability
//!
//! The pipeline only needs two read operations from the control plane. They
//! are expressed as a trait so the backup stages can run against the real
//! API server or an in-memory fake.

mod kubernetes;

pub use kubernetes::KubeClusterApi;

use crate::config::ListFilter;
use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use std::collections::BTreeMap;

/// Read access to the cluster control plane
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List secrets in `namespace` matching exactly one filter predicate
    async fn list_secrets(&self, namespace: &str, filter: &ListFilter) -> Result<Vec<Secret>>;

    /// Read the `data` section of a config map
    ///
    /// A config map without data yields an empty map.
    async fn get_config_map(&self, namespace: &str, name: &str)
        -> Result<BTreeMap<String, String>>;
}
