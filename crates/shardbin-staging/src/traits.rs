//! Staging store abstraction trait

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Staging store operation errors
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Staging store backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for staging operations
pub type StagingResult<T> = Result<T, StagingError>;

impl From<StagingError> for shardbin_core::UploadError {
    fn from(err: StagingError) -> Self {
        shardbin_core::UploadError::Staging(err.to_string())
    }
}

/// Short-lived key-value store with per-key expiration.
///
/// Values are opaque bytes; callers serialize structured records themselves.
/// No transactional multi-key operations are assumed. Per-key atomicity for
/// read-modify-write cycles is provided by [`StagingStore::compare_and_swap`],
/// which the chunk ingestor relies on to keep the session's index set free of
/// lost updates under concurrent ingestion.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Fetch a value. Expired entries read as absent.
    async fn get(&self, key: &str) -> StagingResult<Option<Bytes>>;

    /// Store a value with the given TTL, replacing any existing entry.
    async fn put(&self, key: &str, value: Bytes, ttl: Duration) -> StagingResult<()>;

    /// Replace `key` only if the currently stored value equals `expected`
    /// (`None` = key absent). Returns whether the swap happened.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Bytes>,
        value: Bytes,
        ttl: Duration,
    ) -> StagingResult<bool>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StagingResult<()>;

    /// List live keys starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> StagingResult<Vec<String>>;
}
