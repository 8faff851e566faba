//! `CLUSTER__*` option group

use super::ConfigError;

/// Raw cluster identity options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOptions {
    pub name: String,
    pub config_map_namespace: String,
    pub config_map_name: String,
    pub config_map_key: String,
}

/// Where the cluster name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterIdentity {
    /// Name given directly in the configuration
    Explicit(String),
    /// Name stored under `key` in a config map
    ConfigMap {
        namespace: String,
        name: String,
        key: String,
    },
}

impl ClusterOptions {
    pub(crate) fn validate(&self) -> Result<ClusterIdentity, ConfigError> {
        let lookup = [
            &self.config_map_namespace,
            &self.config_map_name,
            &self.config_map_key,
        ];

        if !self.name.is_empty() {
            if lookup.iter().any(|field| !field.is_empty()) {
                return Err(ConfigError::AmbiguousClusterIdentity);
            }
            return Ok(ClusterIdentity::Explicit(self.name.clone()));
        }

        if lookup.iter().any(|field| field.is_empty()) {
            return Err(ConfigError::AmbiguousClusterIdentity);
        }

        Ok(ClusterIdentity::ConfigMap {
            namespace: self.config_map_namespace.clone(),
            name: self.config_map_name.clone(),
            key: self.config_map_key.clone(),
        })
    }
}
