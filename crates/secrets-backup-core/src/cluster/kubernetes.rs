//! [`ClusterApi`] backed by the Kubernetes API server

use super::ClusterApi;
use crate::config::ListFilter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{Api, ListParams};
use kube::Client;
use std::collections::BTreeMap;
use tracing::debug;

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the in-cluster service account, falling back to
    /// `KUBECONFIG` or `~/.kube/config`
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to load Kubernetes configuration")?;
        debug!("Connected to Kubernetes API (default namespace: {})", client.default_namespace());
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn list_secrets(&self, namespace: &str, filter: &ListFilter) -> Result<Vec<Secret>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let params = match filter {
            ListFilter::Field(selector) => ListParams::default().fields(selector),
            ListFilter::Label(selector) => ListParams::default().labels(selector),
        };
        debug!("Listing secrets in {} with {:?}", namespace, filter);

        // Error::Retrieval names the namespace
        let list = api.list(&params).await?;

        Ok(list.items)
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, String>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        debug!("Reading config map {}/{}", namespace, name);

        // Error::Resolution names the config map
        let config_map = api.get(name).await?;

        Ok(config_map.data.unwrap_or_default())
    }
}

impl std::fmt::Debug for KubeClusterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterApi")
            .field("default_namespace", &self.client.default_namespace())
            .finish_non_exhaustive()
    }
}
