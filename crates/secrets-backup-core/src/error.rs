//! Error types for secrets-backup-core

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using secrets-backup-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the individual backup stages
#[derive(Error, Debug)]
pub enum Error {
    /// Cross-field configuration rule violated
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Cluster name key missing from the designated config map
    #[error("cluster name not found in the '{key}' field of config map {namespace}/{config_map}")]
    ClusterNameNotFound {
        namespace: String,
        config_map: String,
        key: String,
    },

    /// Cluster API failure while resolving the cluster name
    #[error("Failed to read config map {namespace}/{config_map}")]
    Resolution {
        namespace: String,
        config_map: String,
        #[source]
        source: anyhow::Error,
    },

    /// Cluster API failure while listing secrets
    #[error("Failed to list secrets in namespace {namespace}")]
    Retrieval {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },

    /// YAML serialization error
    #[error("Failed to serialize secrets: {0}")]
    Serialization(#[from] serde_yaml_ng::Error),

    /// Local file could not be opened, created or removed
    #[error("IO error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recipient public key could not be parsed
    #[error("Invalid age recipient public key: {reason}")]
    InvalidRecipient { reason: String },

    /// Streaming encryption or sealing of the envelope failed
    #[error("Failed to {step} {path}")]
    Encryption {
        step: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Object store rejected the artifact
    #[error("Failed to upload s3://{bucket}/{key}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Create an IO error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid recipient error
    pub fn invalid_recipient(reason: impl Into<String>) -> Self {
        Self::InvalidRecipient {
            reason: reason.into(),
        }
    }

    /// Create a streaming encryption error
    pub fn encryption(step: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Encryption {
            step,
            path: path.into(),
            source,
        }
    }
}
