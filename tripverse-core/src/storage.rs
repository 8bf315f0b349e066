use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt value under {key}: {message}")]
    Corrupt { key: String, message: String },
}

/// Durable string slots that survive a restart (the browser's local storage, a redis hash, ...).
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, used in mock mode and tests.
#[derive(Default)]
pub struct MemorySessionStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("slot map poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slot_lifecycle() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.get("tripverse_user").await.unwrap(), None);

        storage.set("tripverse_user", "{\"id\":\"1\"}").await.unwrap();
        assert_eq!(
            storage.get("tripverse_user").await.unwrap().as_deref(),
            Some("{\"id\":\"1\"}")
        );

        storage.remove("tripverse_user").await.unwrap();
        assert_eq!(storage.get("tripverse_user").await.unwrap(), None);
    }
}
