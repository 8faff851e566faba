//! Object store capability

mod s3;

pub use s3::S3ObjectStore;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

/// Durable remote storage for backup artifacts
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key` in `bucket`
    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()>;
}
