//! Upload completion.
//!
//! Completion is the commit point of the protocol: verify every chunk index
//! is present, pull the staged bytes in ascending index order, hand the
//! assembled file to the selected backend, write the catalog record, then
//! purge staging. A failure before the catalog write leaves staging intact
//! so the client can retry; purge failures after the commit are logged and
//! swallowed, since the TTL reclaims leftovers anyway.

use bytes::{Bytes, BytesMut};
use chrono::Utc;
use shardbin_core::models::{CatalogRecord, UploadSession};
use shardbin_core::{StorageBackend, UploadError, UploadResult};
use shardbin_staging::keys;
use shardbin_storage::{AssembledFile, CommittedFile};
use uuid::Uuid;

use crate::UploadCoordinator;

/// Result of a successful completion.
#[derive(Debug, Clone)]
pub struct CompletedUpload {
    /// Durable reference to the committed file; also the catalog key.
    pub file_key: String,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub backend: StorageBackend,
    pub blob_key: Option<String>,
    pub relay_message_id: Option<i64>,
    pub total_chunks: u32,
}

impl UploadCoordinator {
    /// Complete a session: verify, reassemble, commit, record, purge.
    pub async fn complete_upload(&self, session_id: Uuid) -> UploadResult<CompletedUpload> {
        let session = self.load_session(session_id).await?;

        if !session.is_complete() {
            return Err(UploadError::IncompleteUpload {
                uploaded: session.uploaded_chunks.len() as u32,
                total: session.total_chunks,
                missing: session.missing_chunks(),
            });
        }

        let data = self.assemble(&session).await?;
        let assembled_size = data.len();
        let file = AssembledFile {
            file_name: session.file_name.clone(),
            content_type: session.content_type.clone(),
            data,
        };

        let start = std::time::Instant::now();
        let committed = self.backends().commit(session.backend, &file).await?;

        self.write_catalog_record(&session, &committed).await?;
        self.purge_staging(&session).await;

        tracing::info!(
            session_id = %session_id,
            file_key = %committed.file_key,
            backend = %committed.backend,
            size_bytes = assembled_size,
            total_chunks = session.total_chunks,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload completed"
        );

        Ok(CompletedUpload {
            file_key: committed.file_key,
            file_name: session.file_name,
            file_size: session.file_size,
            content_type: session.content_type,
            backend: committed.backend,
            blob_key: committed.blob_key,
            relay_message_id: committed.relay_message_id,
            total_chunks: session.total_chunks,
        })
    }

    /// Concatenate the staged chunks in ascending index order. A missing
    /// blob at this point means staging lost data the session record still
    /// claims, which is unrecoverable for this session.
    async fn assemble(&self, session: &UploadSession) -> UploadResult<Bytes> {
        let mut buffer = BytesMut::new();
        for index in 0..session.total_chunks {
            let chunk = self
                .staging()
                .get(&keys::chunk_key(session.session_id, index))
                .await?
                .ok_or(UploadError::ChunkLost { index })?;
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    async fn write_catalog_record(
        &self,
        session: &UploadSession,
        committed: &CommittedFile,
    ) -> UploadResult<()> {
        let record = CatalogRecord {
            file_name: session.file_name.clone(),
            file_size: session.file_size,
            content_type: session.content_type.clone(),
            storage_backend: committed.backend,
            blob_key: committed.blob_key.clone(),
            relay_message_id: committed.relay_message_id,
            chunked: true,
            total_chunks: Some(session.total_chunks),
            uploaded_at: Utc::now(),
        };
        self.catalog().put(&committed.file_key, record).await?;
        Ok(())
    }

    /// Best-effort staging cleanup after a successful commit. Failures are
    /// logged and ignored; the TTL is the backstop.
    async fn purge_staging(&self, session: &UploadSession) {
        let chunk_keys = match self
            .staging()
            .list_keys(&keys::chunk_prefix(session.session_id))
            .await
        {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "Failed to list staged chunks for purge"
                );
                Vec::new()
            }
        };
        for key in chunk_keys {
            if let Err(e) = self.staging().delete(&key).await {
                tracing::warn!(
                    session_id = %session.session_id,
                    key = %key,
                    error = %e,
                    "Failed to purge staged chunk"
                );
            }
        }
        let key = keys::session_key(session.session_id);
        if let Err(e) = self.staging().delete(&key).await {
            tracing::warn!(
                session_id = %session.session_id,
                error = %e,
                "Failed to purge session record"
            );
        }
    }
}
