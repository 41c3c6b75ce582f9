use crate::config::AppConfig;
use crate::storage::CheckinStorage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn CheckinStorage>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn CheckinStorage>) -> Self {
        Self {
            config: Arc::new(config),
            storage,
        }
    }
}
