//! Artifact upload

use crate::error::{Error, Result};
use crate::store::ObjectStore;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;

/// Streams encrypted artifacts into one bucket
pub struct Uploader<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> Uploader<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { store, bucket }
    }

    /// Upload the file at `encrypted_path` under `object_key`
    ///
    /// The file is read as a stream, not loaded into memory.
    pub async fn upload(&self, encrypted_path: &Path, object_key: &str) -> Result<()> {
        let body = ByteStream::from_path(encrypted_path)
            .await
            .map_err(|e| Error::io(encrypted_path, std::io::Error::other(e)))?;

        self.store
            .put_object(self.bucket, object_key, body)
            .await
            .map_err(|source| Error::Upload {
                bucket: self.bucket.to_string(),
                key: object_key.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<Vec<(String, String, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("AccessDenied");
            }
            let bytes = body.collect().await?.into_bytes().to_vec();
            self.objects
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string(), bytes));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_upload_streams_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact.yaml.age.asc");
        std::fs::write(&path, b"-----BEGIN AGE ENCRYPTED FILE-----\n").unwrap();

        let store = MemoryStore::default();
        Uploader::new(&store, "backups")
            .upload(&path, "prod/artifact.yaml.age.asc")
            .await
            .unwrap();

        let objects = store.objects.lock().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].0, "backups");
        assert_eq!(objects[0].1, "prod/artifact.yaml.age.asc");
        assert_eq!(objects[0].2, b"-----BEGIN AGE ENCRYPTED FILE-----\n");
    }

    #[tokio::test]
    async fn test_store_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact");
        std::fs::write(&path, b"x").unwrap();

        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let err = Uploader::new(&store, "backups")
            .upload(&path, "artifact")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upload { .. }));
        assert_eq!(err.to_string(), "Failed to upload s3://backups/artifact");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();

        let err = Uploader::new(&store, "backups")
            .upload(&dir.path().join("missing"), "missing")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(store.objects.lock().unwrap().is_empty());
    }
}
