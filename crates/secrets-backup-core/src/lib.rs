//! # secrets-backup-core
//!
//! One-shot backup of Kubernetes secrets:
//! - **Validation**: cross-field rules over the `S3__`, `SECRET__` and `CLUSTER__` option groups
//! - **Identity**: cluster name from configuration or from a config map
//! - **Collection**: secrets by name or label, server metadata stripped, written as a `v1/SecretList` YAML document
//! - **Encryption**: streaming age (X25519) encryption inside ASCII armor
//! - **Upload**: the armored artifact streamed to an S3-compatible bucket
//!
//! # Example
//!
//! ```no_run
//! use secrets_backup_core::{BackupOptions, BackupPipeline, KubeClusterApi, S3ObjectStore, TracingObserver};
//!
//! # async fn run(options: BackupOptions) -> anyhow::Result<()> {
//! let config = BackupPipeline::validate(&options, &TracingObserver)?;
//! let cluster = KubeClusterApi::try_default().await?;
//! let store = S3ObjectStore::new(&config.s3).await?;
//!
//! let report = BackupPipeline::new(&cluster, &store).execute(&config).await?;
//! println!("uploaded {}", report.artifact.object_key);
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod collector;
pub mod config;
pub mod encryption;
pub mod error;
pub mod identity;
pub mod naming;
pub mod observer;
pub mod pipeline;
pub mod store;
pub mod upload;

pub use cluster::{ClusterApi, KubeClusterApi};
pub use collector::{SecretBundle, SecretCollector, SecretList};
pub use config::{
    BackupConfig, BackupOptions, ClusterIdentity, ClusterOptions, ConfigError, S3Options,
    S3Target, SecretOptions, SecretSelection, SecretSelector,
};
pub use encryption::encrypt_file;
pub use error::{Error, Result};
pub use identity::IdentityResolver;
pub use naming::BackupArtifact;
pub use observer::{BackupObserver, NoOpObserver, TracingObserver};
pub use pipeline::{BackupPipeline, BackupReport, PipelineError, Stage};
pub use store::{ObjectStore, S3ObjectStore};
pub use upload::Uploader;
