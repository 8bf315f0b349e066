use std::sync::Arc;
use tripverse_catalog::{InMemorySource, MemoryStore};
use tripverse_core::{
    DataStore, IdentityProvider, MemoryIdentityProvider, MemorySessionStorage, RecordSource,
    SessionStorage,
};
use tripverse_shared::Masked;
use tripverse_store::app_config::BackendConfig;
use tripverse_store::{Config, DataMode, RedisSessionStorage, RemoteSource, SupabaseClient};

use crate::error::AppError;

/// The collaborators every component is built from, chosen once at startup.
#[derive(Clone)]
pub struct AppState {
    pub mode: DataMode,
    pub store: Arc<dyn DataStore>,
    pub source: Arc<dyn RecordSource>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn SessionStorage>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let storage = session_storage(config)?;
        match config.data_mode() {
            DataMode::Mock => Ok(Self::mock(storage)),
            DataMode::Remote { url, anon_key } => {
                Self::remote(&url, anon_key.expose(), &config.backend, storage)
            }
        }
    }

    /// Demo data, demo accounts.
    pub fn mock(storage: Arc<dyn SessionStorage>) -> Self {
        tracing::warn!("Backend url or anon key missing, using demo data");
        Self {
            mode: DataMode::Mock,
            store: Arc::new(MemoryStore::seeded()),
            source: Arc::new(InMemorySource::new()),
            identity: Arc::new(MemoryIdentityProvider::with_demo_accounts().with_storage(storage.clone())),
            storage,
        }
    }

    pub fn remote(
        url: &str,
        anon_key: &str,
        backend: &BackendConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, AppError> {
        let client = Arc::new(SupabaseClient::new(
            url,
            anon_key,
            backend.request_timeout(),
            storage.clone(),
        )?);
        Ok(Self {
            mode: DataMode::Remote {
                url: url.to_string(),
                anon_key: Masked::from(anon_key),
            },
            store: client.clone(),
            source: Arc::new(RemoteSource::new(client.clone())),
            identity: client,
            storage,
        })
    }
}

fn session_storage(config: &Config) -> Result<Arc<dyn SessionStorage>, AppError> {
    match config.redis.url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            tracing::info!("Session slots stored in redis");
            Ok(Arc::new(RedisSessionStorage::new(url)?))
        }
        None => Ok(Arc::new(MemorySessionStorage::new())),
    }
}
