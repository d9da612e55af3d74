//! Blob-store adapter (S3-compatible object stores, including R2-style
//! endpoints behind a custom URL).

use crate::traits::{AssembledFile, CommittedFile, StorageError, StorageResult};
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, Error as ObjectStoreError, ObjectStore, PutOptions, PutPayload,
};
use rand::{distr::Alphanumeric, Rng};
use shardbin_core::StorageBackend;
use std::sync::Arc;

/// Prefix distinguishing blob-backed file keys in the catalog.
const FILE_KEY_PREFIX: &str = "blob";

/// Object-store backend adapter.
#[derive(Clone)]
pub struct BlobStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl BlobStore {
    /// Build against an S3-compatible store.
    ///
    /// # Arguments
    /// * `bucket` - bucket name
    /// * `region` - region identifier (some providers accept any value)
    /// * `endpoint_url` - custom endpoint for S3-compatible providers
    ///   (e.g. an R2 account endpoint or "http://localhost:9000" for MinIO)
    pub fn from_config(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(BlobStore {
            store: Arc::new(store),
            bucket,
        })
    }

    /// In-memory store, for tests.
    pub fn in_memory() -> Self {
        BlobStore {
            store: Arc::new(InMemory::new()),
            bucket: "memory".to_string(),
        }
    }

    /// Collision-resistant object key: current time plus a random suffix.
    fn generate_object_key(extension: &str) -> String {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(6)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        format!(
            "blob_{}_{}.{}",
            unix_millis_now(),
            suffix,
            extension
        )
    }

    /// Write the assembled file under a fresh object key.
    pub async fn commit(&self, file: &AssembledFile) -> StorageResult<CommittedFile> {
        let object_key = Self::generate_object_key(&file.extension());
        let location = Path::from(object_key.clone());
        let size = file.data.len() as u64;
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            file.content_type.clone().into(),
        );
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(file.data.clone()), opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %object_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Blob upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %object_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Blob upload successful"
        );

        Ok(CommittedFile {
            file_key: format!("{}:{}", FILE_KEY_PREFIX, object_key),
            backend: StorageBackend::Blob,
            blob_key: Some(object_key),
            relay_message_id: None,
        })
    }

    /// Fetch a stored object by its key (collaborator/read path and tests).
    pub async fn download(&self, object_key: &str) -> StorageResult<Bytes> {
        let location = Path::from(object_key.to_string());
        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => {
                StorageError::DownloadFailed(format!("object not found: {}", object_key))
            }
            other => StorageError::DownloadFailed(other.to_string()),
        })?;
        result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))
    }
}

fn unix_millis_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
