pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

use std::sync::Arc;

use config::Config;
use error::{ServiceError, ServiceResult};
use services::{QueryService, UploadGateway};
use storage::ObjectStore;

/// Services that need a live object store client
pub struct Services {
    pub uploads: UploadGateway,
    pub queries: QueryService,
}

impl Services {
    pub fn new(store: Arc<dyn ObjectStore>, config: &Config) -> Self {
        let default_bucket = config.storage.default_bucket.clone();
        Self {
            uploads: UploadGateway::new(
                Arc::clone(&store),
                config.upload.clone(),
                default_bucket.clone(),
            ),
            queries: QueryService::new(store, default_bucket),
        }
    }
}

/// Application state shared across handlers
///
/// The store is optional: the service still starts when no client could be
/// built, and every store-backed route then answers with a 500.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    store: Option<Arc<dyn ObjectStore>>,
    services: Option<Arc<Services>>,
}

impl AppState {
    pub fn new(config: Config, store: Option<Arc<dyn ObjectStore>>) -> Self {
        let services = store
            .as_ref()
            .map(|store| Arc::new(Services::new(Arc::clone(store), &config)));

        Self {
            config: Arc::new(config),
            store,
            services,
        }
    }

    pub fn store(&self) -> Option<&dyn ObjectStore> {
        self.store.as_deref()
    }

    pub fn services(&self) -> ServiceResult<&Services> {
        self.services
            .as_deref()
            .ok_or(ServiceError::StoreUnavailable)
    }
}
