//! Chunk ingestion.
//!
//! Chunks arrive in any order and may be retried. Ingestion stores the raw
//! bytes first, then folds the index into the session record through a
//! compare-and-swap loop so concurrent ingestors never lose each other's
//! updates. A replayed index is acknowledged without touching the stored
//! bytes, which makes client retries safe.

use bytes::Bytes;
use shardbin_core::models::UploadSession;
use shardbin_core::{UploadError, UploadResult};
use shardbin_staging::keys;
use uuid::Uuid;

use crate::UploadCoordinator;

/// Contention bound on the session-record swap loop. Each retry re-reads the
/// record, so exhaustion means the store is livelocked, not busy.
const MAX_CAS_ATTEMPTS: u32 = 16;

/// Ingestion acknowledgement with current session progress.
#[derive(Debug, Clone)]
pub struct ChunkProgress {
    pub session_id: Uuid,
    pub chunk_index: u32,
    pub uploaded_chunks: u32,
    pub total_chunks: u32,
    pub progress_percent: f64,
    pub complete: bool,
    /// False when the index had already been recorded (a retried chunk).
    pub newly_recorded: bool,
}

impl ChunkProgress {
    fn new(session: &UploadSession, chunk_index: u32, newly_recorded: bool) -> Self {
        ChunkProgress {
            session_id: session.session_id,
            chunk_index,
            uploaded_chunks: session.uploaded_chunks.len() as u32,
            total_chunks: session.total_chunks,
            progress_percent: session.progress_percent(),
            complete: session.is_complete(),
            newly_recorded,
        }
    }
}

impl UploadCoordinator {
    /// Stage one chunk of an upload.
    pub async fn ingest_chunk(
        &self,
        session_id: Uuid,
        chunk_index: u32,
        data: Bytes,
    ) -> UploadResult<ChunkProgress> {
        if data.is_empty() {
            return Err(UploadError::InvalidRequest(
                "chunk body must not be empty".to_string(),
            ));
        }

        let session = self.load_session(session_id).await?;

        if chunk_index >= session.total_chunks {
            return Err(UploadError::InvalidRequest(format!(
                "chunkIndex {} out of range for {} chunks",
                chunk_index, session.total_chunks
            )));
        }

        if session.has_chunk(chunk_index) {
            tracing::debug!(
                session_id = %session_id,
                chunk_index,
                "Duplicate chunk acknowledged"
            );
            return Ok(ChunkProgress::new(&session, chunk_index, false));
        }

        let ttl = self.remaining_ttl(&session);
        let size = data.len();

        // Bytes land before the index is recorded, so a crash between the
        // two writes leaves an unrecorded blob, never a dangling index.
        self.staging()
            .put(&keys::chunk_key(session_id, chunk_index), data, ttl)
            .await?;

        let session = self.record_chunk_index(session_id, chunk_index).await?;

        tracing::debug!(
            session_id = %session_id,
            chunk_index,
            size_bytes = size,
            uploaded = session.uploaded_chunks.len(),
            total = session.total_chunks,
            "Chunk staged"
        );

        Ok(ChunkProgress::new(&session, chunk_index, true))
    }

    /// Fold `chunk_index` into the session's received set with a bounded
    /// compare-and-swap loop. Returns the session state as written (or as
    /// found, when another ingestor recorded the index first).
    async fn record_chunk_index(
        &self,
        session_id: Uuid,
        chunk_index: u32,
    ) -> UploadResult<UploadSession> {
        let key = keys::session_key(session_id);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let raw = self
                .staging()
                .get(&key)
                .await?
                .ok_or(UploadError::SessionNotFound(session_id))?;
            let mut session: UploadSession = serde_json::from_slice(&raw)?;

            if !session.record_chunk(chunk_index) {
                return Ok(session);
            }

            let updated = Bytes::from(serde_json::to_vec(&session)?);
            let ttl = self.remaining_ttl(&session);
            if self
                .staging()
                .compare_and_swap(&key, Some(&raw), updated, ttl)
                .await?
            {
                return Ok(session);
            }
        }

        Err(UploadError::Staging(format!(
            "session record update contention exceeded {} attempts",
            MAX_CAS_ATTEMPTS
        )))
    }
}
