use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage_types::StorageBackend;

/// Permanent metadata entry for a completed, committed file.
///
/// Written exactly once by the completion engine and never mutated afterward.
/// Downstream listing/deletion collaborators depend on the serialized field
/// names (`fileName`, `fileSize`, `storageType`, `blobKey`,
/// `relayMessageId`), so this struct serializes in camelCase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    #[serde(rename = "storageType")]
    pub storage_backend: StorageBackend,
    /// Object key inside the blob store, for blob-backed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,
    /// Message identifier in the relay service, required for later deletion
    /// of relay-backed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_message_id: Option<i64>,
    pub chunked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
}
