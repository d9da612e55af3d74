//! Session creation and lookup.

use bytes::Bytes;
use shardbin_core::models::UploadSession;
use shardbin_core::{StorageBackend, UploadError, UploadResult};
use shardbin_staging::keys;
use uuid::Uuid;

use crate::UploadCoordinator;

/// Validated-at-the-engine inputs for a new upload session.
#[derive(Debug, Clone)]
pub struct NewSessionParams {
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub total_chunks: u32,
    /// Backend choice as sent by the client; `None` falls back to the
    /// configured default.
    pub backend_choice: Option<String>,
}

impl UploadCoordinator {
    /// Create a new upload session and persist its record with the full
    /// staging TTL.
    pub async fn create_session(&self, params: NewSessionParams) -> UploadResult<UploadSession> {
        if params.file_name.trim().is_empty() {
            return Err(UploadError::InvalidRequest(
                "fileName must not be empty".to_string(),
            ));
        }
        if params.content_type.trim().is_empty() {
            return Err(UploadError::InvalidRequest(
                "contentType must not be empty".to_string(),
            ));
        }
        if params.file_size == 0 {
            return Err(UploadError::InvalidRequest(
                "fileSize must be greater than zero".to_string(),
            ));
        }
        if params.file_size > self.limits().max_file_size_bytes {
            return Err(UploadError::FileTooLarge {
                size: params.file_size,
                max: self.limits().max_file_size_bytes,
            });
        }
        if params.total_chunks == 0 {
            return Err(UploadError::InvalidRequest(
                "totalChunks must be greater than zero".to_string(),
            ));
        }
        if params.total_chunks > self.limits().max_chunk_count {
            return Err(UploadError::InvalidRequest(format!(
                "totalChunks {} exceeds maximum of {}",
                params.total_chunks,
                self.limits().max_chunk_count
            )));
        }

        // Unrecognized backend choices fall back to the default rather than
        // failing, so older clients keep working as backends are added.
        let backend = params
            .backend_choice
            .as_deref()
            .and_then(|choice| choice.parse::<StorageBackend>().ok())
            .unwrap_or(self.limits().default_backend);

        let session = UploadSession::new(
            params.file_name,
            params.file_size,
            params.content_type,
            params.total_chunks,
            backend,
        );

        let record = Bytes::from(serde_json::to_vec(&session)?);
        self.staging()
            .put(
                &keys::session_key(session.session_id),
                record,
                self.limits().staging_ttl,
            )
            .await?;

        tracing::info!(
            session_id = %session.session_id,
            file_name = %session.file_name,
            file_size = session.file_size,
            total_chunks = session.total_chunks,
            backend = %session.backend,
            "Upload session created"
        );

        Ok(session)
    }

    /// Fetch the current state of a session.
    pub async fn get_session(&self, session_id: Uuid) -> UploadResult<UploadSession> {
        self.load_session(session_id).await
    }
}
