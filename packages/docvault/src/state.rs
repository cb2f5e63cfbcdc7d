use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::auth::CredentialStore;
use crate::config::AppConfig;
use crate::ingest::IngestionService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub blob_store: Arc<dyn BlobStore>,
    /// Holds every version after the first, apart from uploaded names.
    pub revision_store: Arc<dyn BlobStore>,
    /// `None` when authentication is disabled.
    pub credentials: Option<Arc<dyn CredentialStore>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn ingestion(&self) -> IngestionService<'_> {
        IngestionService::new(&self.db, &*self.blob_store, &*self.revision_store)
    }
}
