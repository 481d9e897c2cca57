use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::SessionRegistry;

/// Application state containing shared resources.
pub struct AppState {
    config: Arc<AppConfig>,
    /// The process-wide session directory.
    registry: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let registry = SessionRegistry::new(config.clone());
        Self { config, registry }
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}
