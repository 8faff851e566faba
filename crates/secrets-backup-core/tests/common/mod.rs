//! Common test infrastructure for secrets-backup-core tests
//!
//! In-memory fakes for the cluster API and the object store, a recording
//! observer, and helpers to build secrets and decrypt artifacts.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ManagedFieldsEntry, ObjectMeta};
use k8s_openapi::ByteString;
use secrets_backup_core::config::ListFilter;
use secrets_backup_core::{
    BackupArtifact, BackupObserver, BackupOptions, ClusterApi, ClusterOptions, ObjectStore,
    S3Options, SecretOptions, Stage,
};
use std::collections::BTreeMap;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Mutex;

/// Build a secret with server-assigned metadata populated
pub fn secret(name: &str, namespace: &str, labels: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("1029384".to_string()),
            uid: Some(format!("uid-{}", name)),
            managed_fields: Some(vec![ManagedFieldsEntry {
                manager: Some("helm".to_string()),
                operation: Some("Update".to_string()),
                ..Default::default()
            }]),
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            "password".to_string(),
            ByteString(format!("{}-password", name).into_bytes()),
        )])),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// In-memory cluster that answers selectors the way the API server does
#[derive(Default)]
pub struct FakeCluster {
    pub secrets: Vec<Secret>,
    pub config_maps: BTreeMap<(String, String), BTreeMap<String, String>>,
    pub fail_list: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub fn with_secrets(secrets: Vec<Secret>) -> Self {
        Self {
            secrets,
            ..Default::default()
        }
    }

    pub fn config_map(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        self.config_maps.insert(
            (namespace.to_string(), name.to_string()),
            data.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_secrets(&self, namespace: &str, filter: &ListFilter) -> Result<Vec<Secret>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list {} {:?}", namespace, filter));
        if self.fail_list {
            bail!("secrets is forbidden: User cannot list resource \"secrets\"");
        }

        let matches = |secret: &Secret| -> bool {
            if secret.metadata.namespace.as_deref() != Some(namespace) {
                return false;
            }
            match filter {
                ListFilter::Field(selector) => {
                    selector.strip_prefix("metadata.name=") == secret.metadata.name.as_deref()
                }
                ListFilter::Label(selector) => {
                    let (key, value) = selector.split_once('=').unwrap_or((selector, ""));
                    secret
                        .metadata
                        .labels
                        .as_ref()
                        .and_then(|labels| labels.get(key))
                        .is_some_and(|v| v == value)
                }
            }
        };

        Ok(self.secrets.iter().filter(|s| matches(s)).cloned().collect())
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, String>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get configmap {}/{}", namespace, name));
        self.config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("configmaps \"{}\" not found", name))
    }
}

/// Object store that keeps uploads in memory
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()> {
        if self.fail {
            bail!("NoSuchBucket: The specified bucket does not exist");
        }
        let bytes = body.collect().await?.into_bytes().to_vec();
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }
}

/// Observer that records every event as a line of text
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl BackupObserver for RecordingObserver {
    fn on_stage_started(&self, stage: Stage) {
        self.push(format!("stage {}", stage));
    }

    fn on_cluster_resolved(&self, cluster_name: &str, source: &str) {
        self.push(format!("cluster {} from {}", cluster_name, source));
    }

    fn on_artifact_named(&self, artifact: &BackupArtifact) {
        self.push(format!("artifact {}", artifact.object_key));
    }

    fn on_secrets_collected(&self, names: &[String]) {
        self.push(format!("collected {} [{}]", names.len(), names.join(", ")));
    }

    fn on_encrypted(&self, plaintext_bytes: u64, _encrypted_bytes: u64) {
        self.push(format!("encrypted {}", plaintext_bytes));
    }

    fn on_uploaded(&self, bucket: &str, key: &str) {
        self.push(format!("uploaded {}/{}", bucket, key));
    }

    fn on_failed(&self, stage: Stage, error: &dyn std::error::Error) {
        self.push(format!("failed {}: {}", stage, error));
    }
}

/// Options for a name-selected backup of `prod/db-creds` on cluster `east-1`
pub fn options(work_dir: &Path, recipient: &str) -> BackupOptions {
    BackupOptions {
        s3: S3Options {
            bucket_name: "backups".to_string(),
            path: "k8s/secrets".to_string(),
            region: "us-east-1".to_string(),
            access_key: "AKIAEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            ..Default::default()
        },
        secret: SecretOptions {
            name: "db-creds".to_string(),
            namespace: "prod".to_string(),
            ..Default::default()
        },
        cluster: ClusterOptions {
            name: "east-1".to_string(),
            ..Default::default()
        },
        recipient_public_key: recipient.to_string(),
        backup_dir: work_dir.to_string_lossy().into_owned(),
        ..Default::default()
    }
}

/// Decrypt an armored age artifact with a test identity
pub fn decrypt(identity: &age::x25519::Identity, ciphertext: &[u8]) -> Vec<u8> {
    let reader = age::armor::ArmoredReader::new(BufReader::new(ciphertext));
    let decryptor = age::Decryptor::new(reader).expect("valid age header");
    let mut plaintext = Vec::new();
    decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .expect("decryptable with test identity")
        .read_to_end(&mut plaintext)
        .expect("complete ciphertext");
    plaintext
}
