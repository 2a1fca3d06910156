use std::sync::Arc;

use crate::shared::config::Config;
use crate::shared::data::AnalyticsStore;

/// Общее состояние обработчиков
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnalyticsStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn AnalyticsStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
