//! k8s-secrets-backup - Encrypted backup of Kubernetes secrets
//!
//! Runs one backup: validate the configuration, resolve the cluster name,
//! collect the selected secrets, encrypt them for an age recipient and upload
//! the armored artifact to S3-compatible storage.

mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use secrets_backup_core::{
    BackupPipeline, BackupReport, KubeClusterApi, PipelineError, S3ObjectStore, TracingObserver,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // .env must be loaded before clap reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Pipeline failures were already logged by the observer
            if err.downcast_ref::<PipelineError>().is_none() {
                error!("{:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = BackupPipeline::validate(&cli.backup_options(), &TracingObserver)?;

    let cluster = KubeClusterApi::try_default().await?;
    let store = S3ObjectStore::new(&config.s3).await?;

    let report = BackupPipeline::new(&cluster, &store)
        .execute(&config)
        .await?;
    info!(
        "Backup of {} secret(s) from cluster '{}' stored at s3://{}/{}",
        report.secret_names.len(),
        report.cluster_name,
        report.bucket,
        report.artifact.object_key
    );

    if cli.cleanup {
        remove_local_files(&report);
    }
    Ok(())
}

/// Remove the local artifacts of a finished backup
///
/// The upload already succeeded, so failures here are only warnings.
fn remove_local_files(report: &BackupReport) {
    for path in [&report.plaintext_path, &report.encrypted_path] {
        match std::fs::remove_file(path) {
            Ok(()) => info!("Removed {}", path.display()),
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
