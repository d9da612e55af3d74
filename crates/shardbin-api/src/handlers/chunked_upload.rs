//! Chunked upload handlers.
//!
//! Clients split a large file into fixed-size chunks, push them in any order
//! through the raw-body chunk endpoint, then ask for completion. Completion
//! verifies, reassembles, commits to the session's storage backend, and
//! returns the durable file key.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shardbin_core::models::SessionStatus;
use shardbin_core::{StorageBackend, UploadError};
use shardbin_engine::NewSessionParams;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request to start a chunked upload session
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartChunkedUploadRequest {
    /// Original filename
    #[validate(length(min = 1, max = 512))]
    pub file_name: String,
    /// Total file size in bytes
    pub file_size: u64,
    /// Content type (MIME type)
    #[validate(length(min = 1, max = 255))]
    pub content_type: String,
    /// Total number of chunks the client will send
    pub total_chunks: u32,
    /// Storage backend choice ("blob" or "relay"); server default when omitted
    #[serde(default)]
    pub storage_type: Option<String>,
}

/// Response for a started session
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartChunkedUploadResponse {
    pub session_id: Uuid,
    /// Recommended chunk size in bytes
    pub chunk_size: u64,
    pub total_chunks: u32,
    pub storage_type: StorageBackend,
    /// Seconds until the staging window expires
    pub expires_in_secs: u64,
}

/// Current state of an upload session
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub storage_type: StorageBackend,
    pub status: SessionStatus,
    pub total_chunks: u32,
    /// Received chunk indices, ascending
    pub uploaded_chunks: Vec<u32>,
    /// Outstanding chunk indices, ascending
    pub missing_chunks: Vec<u32>,
    pub progress_percent: f64,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgement for one staged chunk
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChunkUploadResponse {
    pub session_id: Uuid,
    pub chunk_index: u32,
    pub uploaded_chunks: u32,
    pub total_chunks: u32,
    pub progress_percent: f64,
    /// All chunks received; the session is ready for completion
    pub complete: bool,
    /// False when this index had already been staged (a client retry)
    pub newly_recorded: bool,
}

/// Response for a committed upload
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadResponse {
    /// Durable reference to the committed file
    pub file_key: String,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub storage_type: StorageBackend,
    pub total_chunks: u32,
    /// Object key inside the blob store (blob backend only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,
    /// Message id at the relay service (relay backend only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_message_id: Option<i64>,
}

/// Start a chunked upload session
#[utoipa::path(
    post,
    path = "/api/v0/uploads/chunked/start",
    tag = "uploads",
    request_body = StartChunkedUploadRequest,
    responses(
        (status = 200, description = "Chunked upload session created", body = StartChunkedUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "Declared file size too large", body = ErrorResponse)
    )
)]
pub async fn start_chunked_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<StartChunkedUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request
        .validate()
        .map_err(|e| UploadError::InvalidRequest(e.to_string()))?;

    let session = state
        .coordinator
        .create_session(NewSessionParams {
            file_name: request.file_name,
            file_size: request.file_size,
            content_type: request.content_type,
            total_chunks: request.total_chunks,
            backend_choice: request.storage_type,
        })
        .await?;

    Ok(Json(StartChunkedUploadResponse {
        session_id: session.session_id,
        chunk_size: state.coordinator.limits().chunk_size_bytes,
        total_chunks: session.total_chunks,
        storage_type: session.backend,
        expires_in_secs: state.coordinator.limits().staging_ttl.as_secs(),
    }))
}

/// Get the status of an upload session
#[utoipa::path(
    get,
    path = "/api/v0/uploads/chunked/{session_id}",
    tag = "uploads",
    params(
        ("session_id" = Uuid, Path, description = "Upload session ID")
    ),
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse),
        (status = 404, description = "Session not found or expired", body = ErrorResponse)
    )
)]
pub async fn get_chunked_upload(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session = state.coordinator.get_session(session_id).await?;

    Ok(Json(SessionStatusResponse {
        session_id: session.session_id,
        file_name: session.file_name.clone(),
        file_size: session.file_size,
        content_type: session.content_type.clone(),
        storage_type: session.backend,
        status: session.status,
        total_chunks: session.total_chunks,
        missing_chunks: session.missing_chunks(),
        progress_percent: session.progress_percent(),
        created_at: session.created_at,
        uploaded_chunks: session.uploaded_chunks,
    }))
}

/// Upload one chunk. The body is the raw chunk bytes.
#[utoipa::path(
    put,
    path = "/api/v0/uploads/chunked/{session_id}/chunks/{chunk_index}",
    tag = "uploads",
    params(
        ("session_id" = Uuid, Path, description = "Upload session ID"),
        ("chunk_index" = u32, Path, description = "Zero-based chunk index")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Chunk staged", body = ChunkUploadResponse),
        (status = 400, description = "Empty body or index out of range", body = ErrorResponse),
        (status = 404, description = "Session not found or expired", body = ErrorResponse)
    )
)]
pub async fn upload_chunk(
    State(state): State<Arc<AppState>>,
    Path((session_id, chunk_index)): Path<(Uuid, u32)>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let progress = state
        .coordinator
        .ingest_chunk(session_id, chunk_index, body)
        .await?;

    Ok(Json(ChunkUploadResponse {
        session_id: progress.session_id,
        chunk_index: progress.chunk_index,
        uploaded_chunks: progress.uploaded_chunks,
        total_chunks: progress.total_chunks,
        progress_percent: progress.progress_percent,
        complete: progress.complete,
        newly_recorded: progress.newly_recorded,
    }))
}

/// Complete a chunked upload: verify, reassemble, and commit
#[utoipa::path(
    post,
    path = "/api/v0/uploads/chunked/{session_id}/complete",
    tag = "uploads",
    params(
        ("session_id" = Uuid, Path, description = "Upload session ID")
    ),
    responses(
        (status = 200, description = "Upload committed", body = CompleteUploadResponse),
        (status = 400, description = "Chunks still missing", body = ErrorResponse),
        (status = 404, description = "Session not found or expired", body = ErrorResponse),
        (status = 502, description = "Backend rejected the upload", body = ErrorResponse),
        (status = 503, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn complete_chunked_upload(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let completed = state.coordinator.complete_upload(session_id).await?;

    Ok(Json(CompleteUploadResponse {
        file_key: completed.file_key,
        file_name: completed.file_name,
        file_size: completed.file_size,
        content_type: completed.content_type,
        storage_type: completed.backend,
        total_chunks: completed.total_chunks,
        blob_key: completed.blob_key,
        relay_message_id: completed.relay_message_id,
    }))
}
