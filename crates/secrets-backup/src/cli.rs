//! CLI argument parsing with clap
//!
//! Every option is also read from the environment variable named next to it,
//! after `.env` has been loaded. Unset and empty values are equivalent.
//! Boolean variables accept `1`/`0`, `t`/`f`, `true`/`false`, `yes`/`no`
//! and `on`/`off` in any case.

use clap::builder::BoolishValueParser;
use clap::{Args, Parser};
use secrets_backup_core::{BackupOptions, ClusterOptions, S3Options, SecretOptions};

/// k8s-secrets-backup - Encrypted backup of Kubernetes secrets to S3
#[derive(Parser, Debug)]
#[command(name = "k8s-secrets-backup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Remove the local plaintext and encrypted files after a successful upload
    #[arg(
        long,
        env = "CLEANUP_LOCAL_FILES",
        action = clap::ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub cleanup: bool,

    #[command(flatten)]
    pub s3: S3Args,

    #[command(flatten)]
    pub secret: SecretArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// age X25519 public key (age1...) the backup is encrypted to
    #[arg(long, env = "AGE_RECIPIENT_PUBLIC_KEY", default_value = "")]
    pub age_recipient_public_key: String,

    #[arg(long, env = "AGE_PUBLIC_KEY", default_value = "", hide = true)]
    pub age_public_key: String,

    /// Directory for the plaintext and encrypted files
    #[arg(long, env = "BACKUP_DIR", default_value = "")]
    pub backup_dir: String,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "S3")]
pub struct S3Args {
    /// Destination bucket
    #[arg(long, env = "S3__BUCKET_NAME", default_value = "")]
    pub s3_bucket_name: String,

    /// Key prefix inside the bucket
    #[arg(long, env = "S3__PATH", default_value = "")]
    pub s3_path: String,

    #[arg(long, env = "S3__REGION", default_value = "")]
    pub s3_region: String,

    /// Custom endpoint for S3-compatible storage
    #[arg(long, env = "S3__ENDPOINT", default_value = "")]
    pub s3_endpoint: String,

    #[arg(long, env = "S3__ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub s3_access_key: String,

    #[arg(long, env = "S3__SECRET_KEY", default_value = "", hide_env_values = true)]
    pub s3_secret_key: String,

    /// Use path-style bucket addressing
    #[arg(
        long,
        env = "S3__USE_PATH_STYLE",
        action = clap::ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub s3_use_path_style: bool,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Secret selection")]
pub struct SecretArgs {
    /// Back up the single secret with this name
    #[arg(long, env = "SECRET__NAME", default_value = "")]
    pub secret_name: String,

    #[arg(long, env = "SECRET__NAMESPACE", default_value = "")]
    pub secret_namespace: String,

    /// Back up every secret carrying this label (with --secret-label-value)
    #[arg(long, env = "SECRET__LABEL_KEY", default_value = "")]
    pub secret_label_key: String,

    #[arg(long, env = "SECRET__LABEL_VALUE", default_value = "")]
    pub secret_label_value: String,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Cluster name")]
pub struct ClusterArgs {
    /// Cluster name used in artifact names
    #[arg(long, env = "CLUSTER__NAME", default_value = "")]
    pub cluster_name: String,

    /// Namespace of the config map holding the cluster name
    #[arg(long, env = "CLUSTER__NAME_CONFIG_MAP_NAMESPACE", default_value = "")]
    pub cluster_name_config_map_namespace: String,

    #[arg(long, env = "CLUSTER__NAME_CONFIG_MAP_NAME", default_value = "")]
    pub cluster_name_config_map_name: String,

    #[arg(long, env = "CLUSTER__NAME_CONFIG_MAP_KEY", default_value = "")]
    pub cluster_name_config_map_key: String,
}

impl Cli {
    /// Convert the parsed arguments into unvalidated backup options
    pub fn backup_options(&self) -> BackupOptions {
        BackupOptions {
            s3: S3Options {
                bucket_name: self.s3.s3_bucket_name.clone(),
                path: self.s3.s3_path.clone(),
                region: self.s3.s3_region.clone(),
                endpoint: self.s3.s3_endpoint.clone(),
                access_key: self.s3.s3_access_key.clone(),
                secret_key: self.s3.s3_secret_key.clone(),
                use_path_style: self.s3.s3_use_path_style,
            },
            secret: SecretOptions {
                name: self.secret.secret_name.clone(),
                namespace: self.secret.secret_namespace.clone(),
                label_key: self.secret.secret_label_key.clone(),
                label_value: self.secret.secret_label_value.clone(),
            },
            cluster: ClusterOptions {
                name: self.cluster.cluster_name.clone(),
                config_map_namespace: self.cluster.cluster_name_config_map_namespace.clone(),
                config_map_name: self.cluster.cluster_name_config_map_name.clone(),
                config_map_key: self.cluster.cluster_name_config_map_key.clone(),
            },
            recipient_public_key: self.age_recipient_public_key.clone(),
            legacy_public_key: self.age_public_key.clone(),
            backup_dir: self.backup_dir.clone(),
        }
    }
}
