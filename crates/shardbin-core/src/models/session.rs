use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage_types::StorageBackend;

/// Informational session lifecycle tag. A session disappears from staging on
/// completion or TTL expiry; there is no explicit terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Uploading,
}

/// One in-progress chunked upload.
///
/// Round-trips through the staging store as JSON. `uploaded_chunks` is kept in
/// ascending sorted order and never contains duplicates; every mutation goes
/// through [`UploadSession::record_chunk`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadSession {
    pub session_id: Uuid,
    pub file_name: String,
    /// Client-declared size; not verified against the actual bytes.
    pub file_size: u64,
    pub content_type: String,
    pub total_chunks: u32,
    pub backend: StorageBackend,
    pub uploaded_chunks: Vec<u32>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    /// Set once committed through the relay backend; needed for later
    /// deletion by the external management collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_message_id: Option<i64>,
}

impl UploadSession {
    pub fn new(
        file_name: String,
        file_size: u64,
        content_type: String,
        total_chunks: u32,
        backend: StorageBackend,
    ) -> Self {
        UploadSession {
            session_id: Uuid::new_v4(),
            file_name,
            file_size,
            content_type,
            total_chunks,
            backend,
            uploaded_chunks: Vec::new(),
            status: SessionStatus::Pending,
            created_at: Utc::now(),
            relay_message_id: None,
        }
    }

    pub fn has_chunk(&self, index: u32) -> bool {
        self.uploaded_chunks.binary_search(&index).is_ok()
    }

    /// Record a received chunk index, keeping the set sorted and
    /// duplicate-free. Returns false if the index was already present.
    pub fn record_chunk(&mut self, index: u32) -> bool {
        match self.uploaded_chunks.binary_search(&index) {
            Ok(_) => false,
            Err(pos) => {
                self.uploaded_chunks.insert(pos, index);
                self.status = SessionStatus::Uploading;
                true
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.uploaded_chunks.len() == self.total_chunks as usize
    }

    /// Sorted complement of the received set within `[0, total_chunks)`.
    pub fn missing_chunks(&self) -> Vec<u32> {
        (0..self.total_chunks)
            .filter(|i| !self.has_chunk(*i))
            .collect()
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        self.uploaded_chunks.len() as f64 / self.total_chunks as f64 * 100.0
    }
}
