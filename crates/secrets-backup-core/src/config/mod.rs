//! Backup configuration
//!
//! Raw options arrive as flat groups of strings (one group per environment
//! prefix). [`BackupOptions::validate`] checks the cross-field rules of every
//! group and produces an immutable [`BackupConfig`] in which each selector
//! group is a tagged enum, so later stages never inspect field presence.
//!
//! Validation is a pure in-memory check: no I/O and no logging.

mod cluster;
mod s3;
mod secret;

pub use cluster::{ClusterIdentity, ClusterOptions};
pub use s3::{S3Options, S3Target};
pub use secret::{ListFilter, SecretOptions, SecretSelection, SecretSelector};

use std::path::PathBuf;
use thiserror::Error;

/// Work directory used when `BACKUP_DIR` is not set
pub const DEFAULT_WORK_DIR: &str = ".";

/// A violated configuration rule
///
/// The messages name the environment variables an operator has to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("S3__BUCKET_NAME is required")]
    MissingBucket,

    #[error("S3__REGION is required")]
    MissingRegion,

    #[error("S3__ACCESS_KEY is required")]
    MissingAccessKey,

    #[error("S3__SECRET_KEY is required")]
    MissingSecretKey,

    #[error("provide either SECRET__NAME or both SECRET__LABEL_KEY and SECRET__LABEL_VALUE")]
    AmbiguousSecretSelector,

    #[error("SECRET__NAMESPACE is required")]
    MissingSecretNamespace,

    #[error(
        "provide either CLUSTER__NAME or CLUSTER__NAME_CONFIG_MAP_NAMESPACE, \
         CLUSTER__NAME_CONFIG_MAP_NAME, and CLUSTER__NAME_CONFIG_MAP_KEY"
    )]
    AmbiguousClusterIdentity,

    #[error("AGE_RECIPIENT_PUBLIC_KEY is required")]
    MissingRecipient,

    #[error("AGE_RECIPIENT_PUBLIC_KEY and AGE_PUBLIC_KEY are both set to different keys")]
    ConflictingRecipients,
}

/// Unvalidated backup options as read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupOptions {
    /// `S3__*` group
    pub s3: S3Options,
    /// `SECRET__*` group
    pub secret: SecretOptions,
    /// `CLUSTER__*` group
    pub cluster: ClusterOptions,
    /// `AGE_RECIPIENT_PUBLIC_KEY`
    pub recipient_public_key: String,
    /// `AGE_PUBLIC_KEY`, accepted as an alias of the recipient key
    pub legacy_public_key: String,
    /// `BACKUP_DIR`
    pub backup_dir: String,
}

/// Validated, immutable backup configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub s3: S3Target,
    pub secret: SecretSelector,
    pub cluster: ClusterIdentity,
    pub recipient_public_key: String,
    pub work_dir: PathBuf,
}

impl BackupOptions {
    /// Check every rule and build the typed configuration
    ///
    /// Groups are checked in order (S3, secret selector, cluster identity,
    /// recipient) and the first failing rule is returned.
    pub fn validate(&self) -> Result<BackupConfig, ConfigError> {
        let s3 = self.s3.validate()?;
        let secret = self.secret.validate()?;
        let cluster = self.cluster.validate()?;
        let recipient_public_key = self.recipient()?;

        let work_dir = if self.backup_dir.is_empty() {
            PathBuf::from(DEFAULT_WORK_DIR)
        } else {
            PathBuf::from(&self.backup_dir)
        };

        Ok(BackupConfig {
            s3,
            secret,
            cluster,
            recipient_public_key,
            work_dir,
        })
    }

    fn recipient(&self) -> Result<String, ConfigError> {
        let primary = self.recipient_public_key.trim();
        let legacy = self.legacy_public_key.trim();

        match (primary.is_empty(), legacy.is_empty()) {
            (true, true) => Err(ConfigError::MissingRecipient),
            (false, true) => Ok(primary.to_string()),
            (true, false) => Ok(legacy.to_string()),
            (false, false) if primary == legacy => Ok(primary.to_string()),
            (false, false) => Err(ConfigError::ConflictingRecipients),
        }
    }
}
