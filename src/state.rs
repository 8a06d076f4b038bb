use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::media::MediaStorage;

/// Process-wide state shared with every handler through axum `State`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub media: Arc<dyn MediaStorage>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            media,
        }
    }
}
