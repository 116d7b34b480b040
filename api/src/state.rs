//! Shared application state handed to every handler.

use std::sync::Arc;

use cts_core::services::oauth2::AccessTokenService;
use cts_infra::database::DatabasePool;
use cts_shared::OAuth2ProviderConfig;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<AccessTokenService>,
    pub oauth2: Arc<OAuth2ProviderConfig>,
    /// Probed by the health check when present
    pub database: Option<DatabasePool>,
}

impl AppState {
    pub fn new(token_service: Arc<AccessTokenService>, oauth2: OAuth2ProviderConfig) -> Self {
        Self {
            token_service,
            oauth2: Arc::new(oauth2),
            database: None,
        }
    }

    pub fn with_database(mut self, database: DatabasePool) -> Self {
        self.database = Some(database);
        self
    }
}
