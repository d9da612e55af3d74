//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shardbin API",
        version = "0.1.0",
        description = "Chunked upload service. Large files are split into chunks, staged in a short-lived store, and committed on completion to an object-blob store or a bot-relay backend. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::chunked_upload::start_chunked_upload,
        handlers::chunked_upload::get_chunked_upload,
        handlers::chunked_upload::upload_chunk,
        handlers::chunked_upload::complete_chunked_upload,
    ),
    components(schemas(
        handlers::chunked_upload::StartChunkedUploadRequest,
        handlers::chunked_upload::StartChunkedUploadResponse,
        handlers::chunked_upload::SessionStatusResponse,
        handlers::chunked_upload::ChunkUploadResponse,
        handlers::chunked_upload::CompleteUploadResponse,
        error::ErrorResponse,
        shardbin_core::StorageBackend,
        shardbin_core::models::SessionStatus,
    )),
    tags(
        (name = "uploads", description = "Chunked upload lifecycle")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
