//! Configuration module
//!
//! Environment-driven configuration for the upload service: server settings,
//! chunked-upload limits, the staging TTL window, and backend credentials.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Defaults
const CHUNK_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;
const MAX_CHUNK_COUNT: u32 = 10_000;
const STAGING_TTL_SECS: u64 = 3600;
const RELAY_TIMEOUT_SECS: u64 = 60;
const RELAY_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Upper bound on the declared size of a chunked upload.
    pub max_file_size_bytes: u64,
    /// Chunk size hint returned to clients at session creation.
    pub chunk_size_bytes: u64,
    pub max_chunk_count: u32,
    /// Shared TTL for session records and chunk blobs. The clock starts at
    /// session creation and is never extended.
    pub staging_ttl_secs: u64,
    pub default_backend: StorageBackend,
    // Blob backend (S3-compatible object store)
    pub blob_bucket: Option<String>,
    pub blob_region: Option<String>,
    pub blob_endpoint: Option<String>,
    // Relay backend (bot-messaging API)
    pub relay_bot_token: Option<String>,
    pub relay_chat_id: Option<String>,
    pub relay_api_base: String,
    pub relay_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let default_backend = match env::var("DEFAULT_STORAGE_BACKEND") {
            Ok(s) => s
                .parse::<StorageBackend>()
                .map_err(|e| anyhow::anyhow!("DEFAULT_STORAGE_BACKEND: {}", e))?,
            Err(_) => StorageBackend::Relay,
        };

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            max_file_size_bytes: env::var("MAX_FILE_SIZE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILE_SIZE_BYTES),
            chunk_size_bytes: env::var("CHUNK_SIZE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CHUNK_SIZE_BYTES),
            max_chunk_count: env::var("MAX_CHUNK_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CHUNK_COUNT),
            staging_ttl_secs: env::var("STAGING_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(STAGING_TTL_SECS),
            default_backend,
            blob_bucket: env::var("BLOB_BUCKET").ok(),
            blob_region: env::var("BLOB_REGION").ok(),
            blob_endpoint: env::var("BLOB_ENDPOINT").ok(),
            relay_bot_token: env::var("RELAY_BOT_TOKEN").ok(),
            relay_chat_id: env::var("RELAY_CHAT_ID").ok(),
            relay_api_base: env::var("RELAY_API_BASE")
                .unwrap_or_else(|_| RELAY_API_BASE.to_string()),
            relay_timeout_secs: env::var("RELAY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(RELAY_TIMEOUT_SECS),
        })
    }

    pub fn staging_ttl(&self) -> Duration {
        Duration::from_secs(self.staging_ttl_secs)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }

    pub fn blob_configured(&self) -> bool {
        self.blob_bucket.is_some()
    }

    pub fn relay_configured(&self) -> bool {
        self.relay_bot_token.is_some() && self.relay_chat_id.is_some()
    }
}
