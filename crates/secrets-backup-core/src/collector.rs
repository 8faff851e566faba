//! Secret selection, cleanup and serialization

use crate::cluster::ClusterApi;
use crate::config::SecretSelector;
use crate::error::{Error, Result};
use crate::observer::BackupObserver;
use k8s_openapi::api::core::v1::Secret;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `apiVersion` of the written document
pub const LIST_API_VERSION: &str = "v1";

/// `kind` of the written document
pub const LIST_KIND: &str = "SecretList";

/// Secrets retrieved for one backup, with server-assigned metadata removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretBundle {
    items: Vec<Secret>,
}

/// Serialized envelope around the bundle
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretList {
    pub api_version: String,
    pub kind: String,
    pub items: Vec<Secret>,
}

impl SecretBundle {
    /// Build a bundle, stripping every record
    pub fn new(mut items: Vec<Secret>) -> Self {
        items.iter_mut().for_each(strip_server_metadata);
        Self { items }
    }

    pub fn items(&self) -> &[Secret] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Secret names in retrieval order
    pub fn names(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|secret| secret.metadata.name.clone().unwrap_or_default())
            .collect()
    }

    /// Wrap the bundle in its `v1/SecretList` envelope
    pub fn to_list(&self) -> SecretList {
        SecretList {
            api_version: LIST_API_VERSION.to_string(),
            kind: LIST_KIND.to_string(),
            items: self.items.clone(),
        }
    }

    /// Write the bundle as a YAML document, replacing any existing file
    pub fn write_yaml(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);

        serde_yaml_ng::to_writer(&mut writer, &self.to_list())?;

        writer.flush().map_err(|e| Error::io(path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

/// Clear fields that are specific to one cluster instance
///
/// A restored object carrying `resourceVersion` or `uid` is rejected on
/// create, and `managedFields` churns between otherwise identical backups.
pub fn strip_server_metadata(secret: &mut Secret) {
    secret.metadata.resource_version = None;
    secret.metadata.uid = None;
    secret.metadata.managed_fields = None;
}

/// Retrieves the secrets picked by a [`SecretSelector`]
pub struct SecretCollector<'a> {
    cluster: &'a dyn ClusterApi,
}

impl<'a> SecretCollector<'a> {
    pub fn new(cluster: &'a dyn ClusterApi) -> Self {
        Self { cluster }
    }

    /// List the selected secrets and strip them
    ///
    /// No match is not an error: the bundle is simply empty.
    pub async fn collect(
        &self,
        selector: &SecretSelector,
        observer: &dyn BackupObserver,
    ) -> Result<SecretBundle> {
        let filter = selector.selection.filter();

        let items = self
            .cluster
            .list_secrets(&selector.namespace, &filter)
            .await
            .map_err(|source| Error::Retrieval {
                namespace: selector.namespace.clone(),
                source,
            })?;

        let bundle = SecretBundle::new(items);
        observer.on_secrets_collected(&bundle.names());
        Ok(bundle)
    }
}
