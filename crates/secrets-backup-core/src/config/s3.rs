//! `S3__*` option group

use super::ConfigError;

/// Raw object-store options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Options {
    pub bucket_name: String,
    pub path: String,
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub use_path_style: bool,
}

/// Validated object-store target
#[derive(Clone, PartialEq, Eq)]
pub struct S3Target {
    /// Bucket name
    pub bucket: String,
    /// Key prefix joined in front of every artifact name
    pub path_prefix: String,
    /// AWS region
    pub region: String,
    /// Custom S3-compatible endpoint (MinIO, Wasabi, ...)
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub use_path_style: bool,
}

impl S3Options {
    pub(crate) fn validate(&self) -> Result<S3Target, ConfigError> {
        if self.bucket_name.is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        if self.region.is_empty() {
            return Err(ConfigError::MissingRegion);
        }
        if self.access_key.is_empty() {
            return Err(ConfigError::MissingAccessKey);
        }
        if self.secret_key.is_empty() {
            return Err(ConfigError::MissingSecretKey);
        }

        Ok(S3Target {
            bucket: self.bucket_name.clone(),
            path_prefix: self.path.clone(),
            region: self.region.clone(),
            endpoint: (!self.endpoint.is_empty()).then(|| self.endpoint.clone()),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            use_path_style: self.use_path_style,
        })
    }
}

impl std::fmt::Debug for S3Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Target")
            .field("bucket", &self.bucket)
            .field("path_prefix", &self.path_prefix)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("use_path_style", &self.use_path_style)
            .finish_non_exhaustive()
    }
}
