//! Shared types for the backend adapters.

use bytes::Bytes;
use shardbin_core::{StorageBackend, UploadError};
use thiserror::Error;

use crate::{BlobStore, BotRelay};

/// Backend adapter errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend not configured: {0}")]
    NotConfigured(StorageBackend),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for backend operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => UploadError::BackendUnavailable(msg),
            StorageError::NotConfigured(backend) => {
                UploadError::BackendUnavailable(format!("{} backend not configured", backend))
            }
            StorageError::ConfigError(msg) => UploadError::BackendUnavailable(msg),
            StorageError::UploadFailed(msg) | StorageError::DownloadFailed(msg) => {
                UploadError::BackendUploadFailed(msg)
            }
        }
    }
}

/// One reassembled file, ready for commit.
#[derive(Debug, Clone)]
pub struct AssembledFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl AssembledFile {
    /// Lowercased filename extension, defaulting to "bin".
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && *ext != self.file_name)
            .map(str::to_lowercase)
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Durable reference returned by a successful commit.
#[derive(Debug, Clone)]
pub struct CommittedFile {
    /// Client-facing file key; also the catalog record key.
    pub file_key: String,
    pub backend: StorageBackend,
    /// Object key inside the blob store (blob backend only).
    pub blob_key: Option<String>,
    /// Relay message identifier (relay backend only).
    pub relay_message_id: Option<i64>,
}

/// The configured backend adapters, dispatched over the closed
/// [`StorageBackend`] set. Adding a backend means adding a field here and a
/// match arm in [`BackendSet::commit`].
#[derive(Default)]
pub struct BackendSet {
    blob: Option<BlobStore>,
    relay: Option<BotRelay>,
}

impl BackendSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, blob: BlobStore) -> Self {
        self.blob = Some(blob);
        self
    }

    pub fn with_relay(mut self, relay: BotRelay) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blob.is_none() && self.relay.is_none()
    }

    pub fn is_configured(&self, backend: StorageBackend) -> bool {
        match backend {
            StorageBackend::Blob => self.blob.is_some(),
            StorageBackend::Relay => self.relay.is_some(),
        }
    }

    /// Commit the file to the selected backend.
    pub async fn commit(
        &self,
        backend: StorageBackend,
        file: &AssembledFile,
    ) -> StorageResult<CommittedFile> {
        match backend {
            StorageBackend::Blob => match &self.blob {
                Some(blob) => blob.commit(file).await,
                None => Err(StorageError::NotConfigured(backend)),
            },
            StorageBackend::Relay => match &self.relay {
                Some(relay) => relay.commit(file).await,
                None => Err(StorageError::NotConfigured(backend)),
            },
        }
    }
}
