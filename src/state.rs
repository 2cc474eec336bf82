use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::models::Model;
use crate::database::{DocumentStore, Repository};

/// Shared, read-only handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
    pub tokens: TokenCodec,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        let tokens = TokenCodec::from_config(&config.security);
        let passwords = PasswordHasher::new(config.security.bcrypt_cost);
        Self {
            store,
            config: Arc::new(config),
            tokens,
            passwords,
        }
    }

    pub fn repo<T: Model>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}
