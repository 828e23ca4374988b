use std::sync::Arc;

use tracing::error;

use forum_db::Database;

use crate::error::ApiError;
use crate::moderation::Moderator;
use crate::storage::Storage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub moderator: Arc<dyn Moderator>,
    pub storage: Storage,
    pub max_upload_bytes: usize,
    /// Held while an upload records an image row, so concurrent uploads never
    /// write image rows at the same time.
    pub image_writes: tokio::sync::Mutex<()>,
}

impl AppStateInner {
    pub fn new(
        db: Database,
        jwt_secret: String,
        moderator: Arc<dyn Moderator>,
        storage: Storage,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            jwt_secret,
            moderator,
            storage,
            max_upload_bytes,
            image_writes: tokio::sync::Mutex::new(()),
        }
    }
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
