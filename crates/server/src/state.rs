use std::sync::Arc;

use ftpflix_core::{CatalogStore, Config, SanitizedConfig};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<CatalogStore>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(config: Config, store: Arc<CatalogStore>, ws_broadcaster: WsBroadcaster) -> Self {
        Self {
            config,
            store,
            ws_broadcaster,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
