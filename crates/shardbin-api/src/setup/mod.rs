//! Application setup and initialization
//!
//! All application initialization logic lives here, extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use shardbin_core::Config;
use shardbin_engine::{UploadCoordinator, UploadLimits};
use shardbin_staging::{Catalog, MemoryCatalog, MemoryStagingStore, StagingStore};
use shardbin_storage::{BackendSet, BlobStore, BotRelay};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let backends = setup_backends(&config)?;
    if backends.is_empty() {
        anyhow::bail!(
            "No storage backend configured: set BLOB_BUCKET or RELAY_BOT_TOKEN/RELAY_CHAT_ID"
        );
    }
    if !backends.is_configured(config.default_backend) {
        tracing::warn!(
            default_backend = %config.default_backend,
            "Default storage backend is not configured; sessions using it will fail at completion"
        );
    }

    let staging: Arc<dyn StagingStore> = Arc::new(MemoryStagingStore::new());
    let catalog: Arc<dyn Catalog> = Arc::new(MemoryCatalog::new());
    let coordinator = UploadCoordinator::new(
        staging.clone(),
        catalog,
        backends,
        UploadLimits::from_config(&config),
    );

    let state = Arc::new(AppState {
        coordinator,
        staging,
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

fn setup_backends(config: &Config) -> Result<BackendSet> {
    let mut backends = BackendSet::new();

    if let Some(bucket) = &config.blob_bucket {
        let region = config
            .blob_region
            .clone()
            .unwrap_or_else(|| "auto".to_string());
        backends = backends.with_blob(BlobStore::from_config(
            bucket.clone(),
            region,
            config.blob_endpoint.clone(),
        )?);
        tracing::info!(bucket = %bucket, "Blob backend configured");
    }

    if let (Some(token), Some(chat_id)) = (&config.relay_bot_token, &config.relay_chat_id) {
        backends = backends.with_relay(BotRelay::new(
            token.clone(),
            chat_id.clone(),
            config.relay_api_base.clone(),
            config.relay_timeout(),
        )?);
        tracing::info!(chat_id = %chat_id, "Relay backend configured");
    }

    Ok(backends)
}
