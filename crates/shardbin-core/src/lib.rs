//! Shardbin core library
//!
//! Shared types for the chunked-upload service: the error taxonomy, the
//! environment-driven configuration, and the domain models (upload sessions,
//! catalog records, storage backend selection) used by every other crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::Config;
pub use error::{ErrorMetadata, LogLevel, UploadError, UploadResult};
pub use storage_types::StorageBackend;
