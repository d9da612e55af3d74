//! Catalog collaborator contract.
//!
//! The catalog owns the permanent record of committed files. The completion
//! engine writes exactly one record per successful upload, keyed by the
//! backend-returned file key; listing and deletion consumers are external.

use async_trait::async_trait;
use shardbin_core::models::CatalogRecord;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog backend error: {0}")]
    Backend(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for shardbin_core::UploadError {
    fn from(err: CatalogError) -> Self {
        shardbin_core::UploadError::Catalog(err.to_string())
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Persist the record for a committed file. Keys are backend file keys
    /// and are expected to be fresh; an existing record is overwritten.
    async fn put(&self, file_key: &str, record: CatalogRecord) -> CatalogResult<()>;

    /// Fetch a record by file key.
    async fn get(&self, file_key: &str) -> CatalogResult<Option<CatalogRecord>>;
}

/// In-memory [`Catalog`] implementation.
#[derive(Default)]
pub struct MemoryCatalog {
    records: Mutex<HashMap<String, CatalogRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn put(&self, file_key: &str, record: CatalogRecord) -> CatalogResult<()> {
        self.records
            .lock()
            .unwrap()
            .insert(file_key.to_string(), record);
        Ok(())
    }

    async fn get(&self, file_key: &str) -> CatalogResult<Option<CatalogRecord>> {
        Ok(self.records.lock().unwrap().get(file_key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shardbin_core::StorageBackend;

    #[tokio::test]
    async fn test_put_then_get() {
        let catalog = MemoryCatalog::new();
        let record = CatalogRecord {
            file_name: "doc.pdf".to_string(),
            file_size: 10,
            content_type: "application/pdf".to_string(),
            storage_backend: StorageBackend::Blob,
            blob_key: Some("blob_1_abc.pdf".to_string()),
            relay_message_id: None,
            chunked: true,
            total_chunks: Some(2),
            uploaded_at: Utc::now(),
        };
        catalog.put("blob:blob_1_abc.pdf", record).await.unwrap();
        let fetched = catalog.get("blob:blob_1_abc.pdf").await.unwrap().unwrap();
        assert_eq!(fetched.file_name, "doc.pdf");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("missing").await.unwrap().is_none());
    }
}
