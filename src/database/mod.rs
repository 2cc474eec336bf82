pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, Environment};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Repository, Stored};
pub use store::{Document, DocumentStore, GroupCount, Query, StoreError};

/// Open the configured store. Without `DATABASE_URL` only development runs
/// fall back to the in-process store.
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if config.database.url.is_some() {
        let store = PgStore::connect(&config.database).await?;
        return Ok(Arc::new(store));
    }

    if config.environment != Environment::Development {
        return Err(StoreError::ConfigMissing("DATABASE_URL"));
    }

    warn!("DATABASE_URL not set; using in-memory store, data will not persist");
    Ok(Arc::new(MemoryStore::new()))
}

/// Create every known collection if missing.
pub async fn ensure_collections(store: &dyn DocumentStore) -> Result<(), StoreError> {
    for collection in models::COLLECTIONS {
        store.ensure_collection(collection).await?;
    }
    info!("Ensured {} collections", models::COLLECTIONS.len());
    Ok(())
}
