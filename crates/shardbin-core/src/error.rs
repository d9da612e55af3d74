//! Error types module
//!
//! All failures of the chunked-upload core are unified under `UploadError`.
//! Each variant carries enough structured detail for the client to decide its
//! next action (e.g. the exact missing chunk indices on an incomplete
//! completion attempt). The `ErrorMetadata` trait lets errors self-describe
//! their HTTP response characteristics without coupling this crate to any
//! transport.

use uuid::Uuid;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like backend outages
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SESSION_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the same operation can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload session not found or expired: {0}")]
    SessionNotFound(Uuid),

    #[error("File too large: {size} bytes exceeds maximum of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Upload incomplete: {uploaded}/{total} chunks received")]
    IncompleteUpload {
        uploaded: u32,
        total: u32,
        /// Sorted complement of the received index set.
        missing: Vec<u32>,
    },

    #[error("Chunk {index} is missing from staging")]
    ChunkLost { index: u32 },

    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Storage backend upload failed: {0}")]
    BackendUploadFailed(String),

    #[error("Staging store error: {0}")]
    Staging(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

pub type UploadResult<T> = Result<T, UploadError>;

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::Staging(format!("Session record serialization error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, suggested_action, log_level).
/// client_message stays per-variant for dynamic content.
fn static_metadata(err: &UploadError) -> (u16, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        UploadError::InvalidRequest(_) => (
            400,
            "INVALID_REQUEST",
            false,
            Some("Check request parameters and try again"),
            LogLevel::Debug,
        ),
        UploadError::SessionNotFound(_) => (
            404,
            "SESSION_NOT_FOUND",
            false,
            Some("Start a new upload session"),
            LogLevel::Debug,
        ),
        UploadError::FileTooLarge { .. } => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Reduce the file size"),
            LogLevel::Debug,
        ),
        UploadError::IncompleteUpload { .. } => (
            400,
            "INCOMPLETE_UPLOAD",
            true,
            Some("Upload the missing chunks, then complete again"),
            LogLevel::Debug,
        ),
        UploadError::ChunkLost { .. } => (
            500,
            "CHUNK_LOST",
            false,
            Some("Restart the upload with a new session"),
            LogLevel::Error,
        ),
        UploadError::BackendUnavailable(_) => (
            503,
            "BACKEND_UNAVAILABLE",
            true,
            Some("Retry completion after a short delay"),
            LogLevel::Warn,
        ),
        UploadError::BackendUploadFailed(_) => (
            502,
            "BACKEND_UPLOAD_FAILED",
            true,
            Some("Retry completion after a short delay"),
            LogLevel::Warn,
        ),
        UploadError::Staging(_) => (
            500,
            "STAGING_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        UploadError::Catalog(_) => (
            500,
            "CATALOG_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl UploadError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            UploadError::InvalidRequest(_) => "InvalidRequest",
            UploadError::SessionNotFound(_) => "SessionNotFound",
            UploadError::FileTooLarge { .. } => "FileTooLarge",
            UploadError::IncompleteUpload { .. } => "IncompleteUpload",
            UploadError::ChunkLost { .. } => "ChunkLost",
            UploadError::BackendUnavailable(_) => "BackendUnavailable",
            UploadError::BackendUploadFailed(_) => "BackendUploadFailed",
            UploadError::Staging(_) => "Staging",
            UploadError::Catalog(_) => "Catalog",
        }
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            // Internal store details stay out of client responses.
            UploadError::Staging(_) => "Staging store error".to_string(),
            UploadError::Catalog(_) => "Catalog write failed".to_string(),
            other => other.to_string(),
        }
    }
}
