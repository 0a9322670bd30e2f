//! Shared application state.
//!
//! Registered once as `web::Data<AppState>` and read by the identity filter and every
//! handler. The stores are the only mutable parts and guard themselves.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{AuthService, PasswordHasher, TokenCodec};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{MemoryStore, PgStore, TaskStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        hasher: PasswordHasher,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            auth: AuthService::new(users, hasher, tokens),
            tasks,
        }
    }

    /// State backed by a fresh `MemoryStore` for both users and tasks.
    pub fn in_memory(hasher: PasswordHasher, tokens: TokenCodec) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, hasher, tokens)
    }

    /// Builds the state described by `config`, connecting to Postgres when a URL is set.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let tokens = TokenCodec::new(
            config.jwt_secret.as_bytes(),
            Duration::seconds(config.jwt_expiration_secs),
        );

        match &config.database_url {
            Some(url) => {
                let store = Arc::new(PgStore::connect(url).await?);
                log::info!("using Postgres store");
                Ok(Self::new(store.clone(), store, hasher, tokens))
            }
            None => {
                log::warn!("DATABASE_URL is not set; data lives in memory and is lost on exit");
                Ok(Self::in_memory(hasher, tokens))
            }
        }
    }
}
