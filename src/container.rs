use std::sync::Arc;

use crate::backend::live::{
    BackendClient, LiveAuthService, LiveDatabaseService, LiveStorageService,
};
use crate::backend::mock::{MockAuthService, MockDatabaseService, MockStorageService};
use crate::catalog::Catalog;
use crate::config::{AppConfig, BackendKind};
use crate::services::auth_service::AuthService;
use crate::services::database_service::DatabaseService;
use crate::services::storage_service::StorageService;

/// The three backend facades the UI tree depends on. Built once at startup
/// from the configured backend kind and handed down through the composition
/// root; the contained services are shared and never reassigned.
pub struct ServiceContainer {
    pub auth: Arc<dyn AuthService>,
    pub database: Arc<dyn DatabaseService>,
    pub storage: Arc<dyn StorageService>,
}

impl ServiceContainer {
    /// Adding a backend means adding an arm here; call sites stay untouched.
    pub fn build(config: &AppConfig, catalog: Arc<Catalog>) -> Self {
        match config.backend {
            BackendKind::Live => Self::live(config),
            BackendKind::Mock => Self::mock(catalog),
        }
    }

    pub fn live(config: &AppConfig) -> Self {
        let client = Arc::new(BackendClient::new(&config.backend_url, &config.backend_key));
        Self {
            auth: Arc::new(LiveAuthService::new(Arc::clone(&client))),
            database: Arc::new(LiveDatabaseService::new(Arc::clone(&client))),
            storage: Arc::new(LiveStorageService::new(client)),
        }
    }

    pub fn mock(catalog: Arc<Catalog>) -> Self {
        Self {
            auth: Arc::new(MockAuthService::new()),
            database: Arc::new(MockDatabaseService::new(catalog)),
            storage: Arc::new(MockStorageService::new()),
        }
    }
}
