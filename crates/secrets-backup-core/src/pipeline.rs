//! Backup pipeline driver
//!
//! ```text
//! Validating -> ResolvingIdentity -> Collecting -> Encrypting -> Uploading -> Done
//!      \               \                 \             \             \
//!       `---------------`-----------------`-------------`-------------`--> Failed
//! ```
//!
//! Stages run strictly in order and each one starts only after the previous
//! one succeeded. A failure ends the run; files already written and objects
//! already uploaded are left in place, and re-running with a new timestamp is
//! the recovery path.

use crate::cluster::ClusterApi;
use crate::collector::SecretCollector;
use crate::config::{BackupConfig, BackupOptions};
use crate::encryption::encrypt_file;
use crate::error::Error;
use crate::identity::IdentityResolver;
use crate::naming::BackupArtifact;
use crate::observer::{BackupObserver, TracingObserver};
use crate::store::ObjectStore;
use crate::upload::Uploader;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validating,
    ResolvingIdentity,
    Collecting,
    Encrypting,
    Uploading,
    Done,
    Failed,
}

impl Stage {
    /// Next state after a successful stage; terminal states stay put
    pub fn next(self) -> Self {
        match self {
            Stage::Validating => Stage::ResolvingIdentity,
            Stage::ResolvingIdentity => Stage::Collecting,
            Stage::Collecting => Stage::Encrypting,
            Stage::Encrypting => Stage::Uploading,
            Stage::Uploading => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::ResolvingIdentity => "resolving-identity",
            Stage::Collecting => "collecting",
            Stage::Encrypting => "encrypting",
            Stage::Uploading => "uploading",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A stage error together with the stage it happened in
#[derive(Error, Debug)]
#[error("backup failed while {stage}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub cluster_name: String,
    pub artifact: BackupArtifact,
    pub captured_at: DateTime<Utc>,
    /// Names of the secrets in the artifact, in retrieval order
    pub secret_names: Vec<String>,
    pub plaintext_path: PathBuf,
    pub encrypted_path: PathBuf,
    pub plaintext_bytes: u64,
    pub encrypted_bytes: u64,
    pub bucket: String,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Sequences validation, identity resolution, collection, encryption and upload
pub struct BackupPipeline<'a> {
    cluster: &'a dyn ClusterApi,
    store: &'a dyn ObjectStore,
    observer: &'a dyn BackupObserver,
    clock: Clock,
}

impl<'a> BackupPipeline<'a> {
    /// Create a pipeline that logs through [`TracingObserver`] and uses the system clock
    pub fn new(cluster: &'a dyn ClusterApi, store: &'a dyn ObjectStore) -> Self {
        Self {
            cluster,
            store,
            observer: &TracingObserver,
            clock: Box::new(Utc::now),
        }
    }

    /// Report events to `observer` instead
    pub fn with_observer(mut self, observer: &'a dyn BackupObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Take capture timestamps from `clock`
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Validate `options`, reporting through `observer`
    ///
    /// Kept separate from [`BackupPipeline::execute`] so callers can build
    /// their collaborators from the validated configuration.
    pub fn validate(
        options: &BackupOptions,
        observer: &dyn BackupObserver,
    ) -> Result<BackupConfig, PipelineError> {
        observer.on_stage_started(Stage::Validating);
        options.validate().map_err(|e| {
            let source = Error::from(e);
            observer.on_failed(Stage::Validating, &source);
            PipelineError {
                stage: Stage::Validating,
                source,
            }
        })
    }

    /// Validate and run every stage
    pub async fn run(&self, options: &BackupOptions) -> Result<BackupReport, PipelineError> {
        let config = Self::validate(options, self.observer)?;
        self.execute(&config).await
    }

    /// Run the stages after validation
    pub async fn execute(&self, config: &BackupConfig) -> Result<BackupReport, PipelineError> {
        let observer = self.observer;

        let stage = Stage::ResolvingIdentity;
        observer.on_stage_started(stage);
        let cluster_name = self.check(
            stage,
            IdentityResolver::new(self.cluster)
                .resolve(&config.cluster, observer)
                .await,
        )?;

        let captured_at = (self.clock)();
        let artifact = BackupArtifact::new(
            &cluster_name,
            &config.secret.selection,
            captured_at,
            &config.s3.path_prefix,
        );
        observer.on_artifact_named(&artifact);

        let plaintext_path = config.work_dir.join(&artifact.plaintext_name);
        let encrypted_path = config.work_dir.join(&artifact.encrypted_name);

        let stage = stage.next();
        observer.on_stage_started(stage);
        let bundle = self.check(
            stage,
            SecretCollector::new(self.cluster)
                .collect(&config.secret, observer)
                .await,
        )?;
        self.check(stage, bundle.write_yaml(&plaintext_path))?;

        let stage = stage.next();
        observer.on_stage_started(stage);
        let (plaintext_bytes, encrypted_bytes) = self.check(
            stage,
            encrypt_blocking(
                config.recipient_public_key.clone(),
                plaintext_path.clone(),
                encrypted_path.clone(),
            )
            .await,
        )?;
        observer.on_encrypted(plaintext_bytes, encrypted_bytes);

        let stage = stage.next();
        observer.on_stage_started(stage);
        self.check(
            stage,
            Uploader::new(self.store, &config.s3.bucket)
                .upload(&encrypted_path, &artifact.object_key)
                .await,
        )?;
        observer.on_uploaded(&config.s3.bucket, &artifact.object_key);
        observer.on_stage_started(stage.next());

        Ok(BackupReport {
            cluster_name,
            artifact,
            captured_at,
            secret_names: bundle.names(),
            plaintext_path,
            encrypted_path,
            plaintext_bytes,
            encrypted_bytes,
            bucket: config.s3.bucket.clone(),
        })
    }

    /// Attribute a stage result to `stage`, reporting failures
    fn check<T>(&self, stage: Stage, result: crate::Result<T>) -> Result<T, PipelineError> {
        result.map_err(|source| {
            self.observer.on_failed(stage, &source);
            PipelineError { stage, source }
        })
    }
}

/// Encrypt on the blocking pool; returns plaintext and encrypted sizes
async fn encrypt_blocking(
    recipient_public_key: String,
    plaintext_path: PathBuf,
    encrypted_path: PathBuf,
) -> crate::Result<(u64, u64)> {
    let task_path = encrypted_path.clone();
    tokio::task::spawn_blocking(move || -> crate::Result<(u64, u64)> {
        let plaintext_bytes = encrypt_file(&recipient_public_key, &plaintext_path, &task_path)?;
        let encrypted_bytes = std::fs::metadata(&task_path)
            .map_err(|e| Error::io(&task_path, e))?
            .len();
        Ok((plaintext_bytes, encrypted_bytes))
    })
    .await
    .map_err(|e| {
        Error::encryption("run encryption for", encrypted_path, std::io::Error::other(e))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Validating;
        let mut visited = vec![stage];
        while !stage.is_terminal() {
            stage = stage.next();
            visited.push(stage);
        }

        assert_eq!(
            visited,
            vec![
                Stage::Validating,
                Stage::ResolvingIdentity,
                Stage::Collecting,
                Stage::Encrypting,
                Stage::Uploading,
                Stage::Done,
            ]
        );
        assert_eq!(Stage::Failed.next(), Stage::Failed);
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError {
            stage: Stage::Encrypting,
            source: Error::invalid_recipient("invalid Bech32 encoding"),
        };

        assert_eq!(err.to_string(), "backup failed while encrypting");
        assert_eq!(
            std::error::Error::source(&err).unwrap().to_string(),
            "Invalid age recipient public key: invalid Bech32 encoding"
        );
    }

    #[tokio::test]
    async fn test_encrypt_blocking_reports_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let plaintext_path = dir.path().join("in.yaml");
        let encrypted_path = dir.path().join("in.yaml.age.asc");
        std::fs::write(&plaintext_path, "apiVersion: v1\nkind: SecretList\nitems: []\n").unwrap();
        let identity = age::x25519::Identity::generate();

        let (plaintext_bytes, encrypted_bytes) = encrypt_blocking(
            identity.to_public().to_string(),
            plaintext_path,
            encrypted_path.clone(),
        )
        .await
        .unwrap();

        assert_eq!(plaintext_bytes, 42);
        assert_eq!(
            encrypted_bytes,
            std::fs::metadata(&encrypted_path).unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_encrypt_blocking_propagates_stage_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = encrypt_blocking(
            "age1notakey".to_string(),
            dir.path().join("in.yaml"),
            dir.path().join("out.asc"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::InvalidRecipient { .. }));
    }
}
