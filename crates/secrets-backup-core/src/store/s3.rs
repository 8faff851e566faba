//! S3 object store
//!
//! Supports AWS S3 and S3-compatible storage (MinIO, Wasabi, DigitalOcean Spaces).

use super::ObjectStore;
use crate::config::S3Target;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

/// Name reported for the static credentials taken from the configuration
const CREDENTIALS_PROVIDER: &str = "k8s-secrets-backup";

/// S3 client configured from an [`S3Target`]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a client with static credentials, region and optional endpoint
    pub async fn new(target: &S3Target) -> Result<Self> {
        let credentials = Credentials::new(
            &target.access_key,
            &target.secret_key,
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(target.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint_url) = target.endpoint.as_deref() {
            debug!("Using custom S3 endpoint: {}", endpoint_url);
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        if target.use_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()> {
        debug!("Uploading s3://{}/{}", bucket, key);

        let resp = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type("text/plain")
            .send()
            .await
            .with_context(|| format!("PutObject s3://{}/{}", bucket, key))?;

        debug!(
            "Stored s3://{}/{} (etag: {})",
            bucket,
            key,
            resp.e_tag().unwrap_or("-")
        );

        Ok(())
    }
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore").finish_non_exhaustive()
    }
}
