//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{AuthBackend, ObjectStorage, PostStore, ProfileStore, UserRepository};
use quill_core::services::{CoverUploader, LoginService, PostGateway, ProfileService, SessionGate};
use quill_infra::{
    Argon2PasswordService, InMemoryPostStore, InMemoryProfileStore, InMemoryRateLimiter,
    InMemoryUserRepository, JwtTokenService, LocalAuthBackend, LocalObjectStorage,
    LocalStorageConfig,
};

#[cfg(feature = "postgres")]
use quill_infra::{PostgresPostStore, PostgresProfileStore, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state. Every adapter is built once here and injected
/// into the services as a port.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthBackend>,
    pub gate: SessionGate,
    pub posts: PostGateway,
    pub login: Arc<LoginService>,
    pub profiles: Arc<ProfileService>,
    pub covers: Arc<CoverUploader>,
    pub storage: Arc<dyn ObjectStorage>,
}

struct Stores {
    posts: Arc<dyn PostStore>,
    profiles: Arc<dyn ProfileStore>,
    users: Arc<dyn UserRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            posts: Arc::new(InMemoryPostStore::new()),
            profiles: Arc::new(InMemoryProfileStore::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

/// Errors raised while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[cfg(feature = "postgres")]
    #[error("Failed to connect to database: {0}")]
    Database(String),
}

impl AppState {
    /// Build the application state: PostgreSQL when `DATABASE_URL` is set,
    /// in memory otherwise. A configured database that cannot be reached is
    /// an error.
    pub async fn new(config: &AppConfig) -> Result<Self, StateError> {
        #[cfg(feature = "postgres")]
        let stores = match &config.database {
            Some(db_config) => {
                let conn = db_config
                    .connect()
                    .await
                    .map_err(|e| StateError::Database(e.to_string()))?;
                Stores {
                    posts: Arc::new(PostgresPostStore::new(conn.clone())),
                    profiles: Arc::new(PostgresProfileStore::new(conn.clone())),
                    users: Arc::new(PostgresUserRepository::new(conn)),
                }
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Stores::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let stores = {
            tracing::info!("Running without postgres feature - using in-memory stores");
            Stores::in_memory()
        };

        let state = Self::build(config, stores);
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// State backed entirely by in-memory stores.
    #[cfg(test)]
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::build(config, Stores::in_memory())
    }

    fn build(config: &AppConfig, stores: Stores) -> Self {
        let auth: Arc<dyn AuthBackend> = Arc::new(LocalAuthBackend::new(
            stores.users,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(InMemoryRateLimiter::new(config.auth_rate_limit.clone())),
        ));

        let storage: Arc<dyn ObjectStorage> =
            Arc::new(LocalObjectStorage::new(LocalStorageConfig {
                root: config.storage.dir.clone(),
                bucket: config.storage.bucket.clone(),
                public_base_url: config.public_base_url.clone(),
                signing_secret: config.jwt.secret.clone(),
            }));

        let gate = SessionGate::new(&config.admin_email);

        Self {
            login: Arc::new(LoginService::new(
                Arc::clone(&auth),
                gate.clone(),
                config.login,
            )),
            posts: PostGateway::new(stores.posts),
            profiles: Arc::new(ProfileService::new(stores.profiles)),
            covers: Arc::new(CoverUploader::new(
                Arc::clone(&storage),
                config.storage.signed_url_ttl,
            )),
            auth,
            gate,
            storage,
        }
    }
}
