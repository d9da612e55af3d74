//! Shared application state.

use shardbin_core::Config;
use shardbin_engine::UploadCoordinator;
use shardbin_staging::StagingStore;
use std::sync::Arc;

/// State handed to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub coordinator: UploadCoordinator,
    /// Same store the coordinator uses; kept here for health probes.
    pub staging: Arc<dyn StagingStore>,
    pub config: Config,
}
