//! Pipeline observation and logging
//!
//! This module provides the `BackupObserver` trait that receives the
//! diagnostic events of a backup run, and a `TracingObserver` implementation
//! that logs them using the `tracing` crate.

use crate::naming::BackupArtifact;
use crate::pipeline::Stage;
use std::error::Error;
use tracing::{debug, error, info};

/// Observer trait for backup pipeline events
///
/// Every component reports through an injected observer instead of a
/// process-wide logger, so a run's output can be captured in tests.
pub trait BackupObserver: Send + Sync {
    /// Called when a stage is entered
    fn on_stage_started(&self, stage: Stage);

    /// Called once the cluster name is known
    ///
    /// # Arguments
    ///
    /// * `cluster_name` - The resolved name
    /// * `source` - Where it came from, e.g. `configuration` or `config map kube-system/info`
    fn on_cluster_resolved(&self, cluster_name: &str, source: &str);

    /// Called once the artifact names are derived
    fn on_artifact_named(&self, artifact: &BackupArtifact);

    /// Called after the secrets are retrieved and cleaned
    fn on_secrets_collected(&self, names: &[String]);

    /// Called after the encrypted artifact is sealed
    fn on_encrypted(&self, plaintext_bytes: u64, encrypted_bytes: u64);

    /// Called after the object store accepted the artifact
    fn on_uploaded(&self, bucket: &str, key: &str);

    /// Called when a stage fails; the run stops afterwards
    fn on_failed(&self, stage: Stage, error: &dyn Error);
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl BackupObserver for NoOpObserver {
    fn on_stage_started(&self, _stage: Stage) {}

    fn on_cluster_resolved(&self, _cluster_name: &str, _source: &str) {}

    fn on_artifact_named(&self, _artifact: &BackupArtifact) {}

    fn on_secrets_collected(&self, _names: &[String]) {}

    fn on_encrypted(&self, _plaintext_bytes: u64, _encrypted_bytes: u64) {}

    fn on_uploaded(&self, _bucket: &str, _key: &str) {}

    fn on_failed(&self, _stage: Stage, _error: &dyn Error) {}
}

/// An observer that logs pipeline events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_stage_started`: DEBUG
/// - `on_failed`: ERROR, with the full source chain
/// - everything else: INFO
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl BackupObserver for TracingObserver {
    fn on_stage_started(&self, stage: Stage) {
        debug!(stage = %stage, "Entering stage");
    }

    fn on_cluster_resolved(&self, cluster_name: &str, source: &str) {
        info!("k8s cluster name: '{}' (from {})", cluster_name, source);
    }

    fn on_artifact_named(&self, artifact: &BackupArtifact) {
        info!("not encrypted secrets file name: {}", artifact.plaintext_name);
        info!("encrypted secrets file name: {}", artifact.encrypted_name);
        info!("s3 key: {}", artifact.object_key);
    }

    fn on_secrets_collected(&self, names: &[String]) {
        info!(
            "Total Secrets {}, Secret Name(s): {}",
            names.len(),
            names.join(", ")
        );
    }

    fn on_encrypted(&self, plaintext_bytes: u64, encrypted_bytes: u64) {
        info!(
            "Encrypted {} bytes into {} bytes of armored age ciphertext",
            plaintext_bytes, encrypted_bytes
        );
    }

    fn on_uploaded(&self, bucket: &str, key: &str) {
        info!("Uploaded s3://{}/{}", bucket, key);
    }

    fn on_failed(&self, stage: Stage, error: &dyn Error) {
        error!(stage = %stage, error = %ErrorChain(error), "Backup failed");
    }
}

/// Displays an error followed by its sources, separated by `: `
struct ErrorChain<'a>(&'a dyn Error);

impl std::fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}
