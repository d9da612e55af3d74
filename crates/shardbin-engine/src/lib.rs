//! Chunked-upload coordination engine.
//!
//! The [`UploadCoordinator`] owns the full upload lifecycle: session
//! creation, out-of-order idempotent chunk ingestion, and completion
//! (verification, reassembly, backend commit, catalog write, staging purge).
//! It is transport-agnostic; the HTTP layer translates its results and
//! [`shardbin_core::UploadError`]s into responses.

use chrono::Utc;
use shardbin_core::{Config, StorageBackend, UploadError, UploadResult};
use shardbin_core::models::UploadSession;
use shardbin_staging::{keys, Catalog, StagingStore};
use shardbin_storage::BackendSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub mod complete;
pub mod ingest;
pub mod session;

pub use complete::CompletedUpload;
pub use ingest::ChunkProgress;
pub use session::NewSessionParams;

/// Floor for remaining-TTL writes. A session on the verge of expiry still
/// needs its re-puts to land with a nonzero lifetime.
const MIN_REMAINING_TTL: Duration = Duration::from_secs(1);

/// Upload limits and defaults, lifted out of [`Config`] so tests can build
/// coordinators without touching the environment.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size_bytes: u64,
    /// Chunk size hint handed to clients at session creation.
    pub chunk_size_bytes: u64,
    pub max_chunk_count: u32,
    pub staging_ttl: Duration,
    pub default_backend: StorageBackend,
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        UploadLimits {
            max_file_size_bytes: config.max_file_size_bytes,
            chunk_size_bytes: config.chunk_size_bytes,
            max_chunk_count: config.max_chunk_count,
            staging_ttl: config.staging_ttl(),
            default_backend: config.default_backend,
        }
    }
}

/// Orchestrates chunked uploads over a staging store, a catalog, and the
/// configured storage backends.
pub struct UploadCoordinator {
    staging: Arc<dyn StagingStore>,
    catalog: Arc<dyn Catalog>,
    backends: BackendSet,
    limits: UploadLimits,
}

impl UploadCoordinator {
    pub fn new(
        staging: Arc<dyn StagingStore>,
        catalog: Arc<dyn Catalog>,
        backends: BackendSet,
        limits: UploadLimits,
    ) -> Self {
        UploadCoordinator {
            staging,
            catalog,
            backends,
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub(crate) fn staging(&self) -> &dyn StagingStore {
        self.staging.as_ref()
    }

    pub(crate) fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub(crate) fn backends(&self) -> &BackendSet {
        &self.backends
    }

    /// Load a live session record or fail with `SessionNotFound`. Expired
    /// records read as absent, so TTL expiry surfaces here too.
    pub(crate) async fn load_session(&self, session_id: Uuid) -> UploadResult<UploadSession> {
        let raw = self
            .staging
            .get(&keys::session_key(session_id))
            .await?
            .ok_or(UploadError::SessionNotFound(session_id))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// TTL left on a session's staging window. The clock starts at session
    /// creation and is never extended; re-puts of the session record and
    /// chunk blobs carry only what remains.
    pub(crate) fn remaining_ttl(&self, session: &UploadSession) -> Duration {
        let elapsed = Utc::now()
            .signed_duration_since(session.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        self.limits
            .staging_ttl
            .checked_sub(elapsed)
            .unwrap_or(Duration::ZERO)
            .max(MIN_REMAINING_TTL)
    }
}
