//! Cluster name resolution

use crate::cluster::ClusterApi;
use crate::config::ClusterIdentity;
use crate::error::{Error, Result};
use crate::observer::BackupObserver;

/// Resolves the human-readable cluster name used in artifact names
pub struct IdentityResolver<'a> {
    cluster: &'a dyn ClusterApi,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self { cluster }
    }

    /// Return the configured name, or read it from the designated config map
    pub async fn resolve(
        &self,
        identity: &ClusterIdentity,
        observer: &dyn BackupObserver,
    ) -> Result<String> {
        let (namespace, config_map, key) = match identity {
            ClusterIdentity::Explicit(name) => {
                observer.on_cluster_resolved(name, "configuration");
                return Ok(name.clone());
            }
            ClusterIdentity::ConfigMap {
                namespace,
                name,
                key,
            } => (namespace, name, key),
        };

        let data = self
            .cluster
            .get_config_map(namespace, config_map)
            .await
            .map_err(|source| Error::Resolution {
                namespace: namespace.clone(),
                config_map: config_map.clone(),
                source,
            })?;

        let cluster_name = data
            .get(key)
            .cloned()
            .ok_or_else(|| Error::ClusterNameNotFound {
                namespace: namespace.clone(),
                config_map: config_map.clone(),
                key: key.clone(),
            })?;

        observer.on_cluster_resolved(
            &cluster_name,
            &format!("config map {}/{}", namespace, config_map),
        );
        Ok(cluster_name)
    }
}
