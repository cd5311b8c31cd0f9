use std::sync::Arc;

use crate::db::DbPool;
use crate::hub::HubHandle;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection wrapped in Arc<Mutex>
    pub db: DbPool,
    /// Handle to the hub task owning the connection registry
    pub hub: HubHandle,
    /// Configured room name catalog
    pub rooms: Arc<Vec<String>>,
}
