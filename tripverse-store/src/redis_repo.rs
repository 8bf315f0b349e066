use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use tripverse_core::{SessionStorage, StorageError};

const DEFAULT_NAMESPACE: &str = "tripverse:session";

/// Session slots kept in a redis hash, so a restarted process picks up the
/// previous user and backend session.
#[derive(Clone)]
pub struct RedisSessionStorage {
    client: redis::Client,
    namespace: String,
}

impl RedisSessionStorage {
    pub fn new(connection_string: &str) -> Result<Self, StorageError> {
        Self::with_namespace(connection_string, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(connection_string: &str, namespace: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(connection_string).map_err(unavailable)?;
        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)
    }
}

fn unavailable(e: redis::RedisError) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

#[async_trait]
impl SessionStorage for RedisSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.hget(&self.namespace, key).await.map_err(unavailable)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        conn.hset::<_, _, _, ()>(&self.namespace, key, value)
            .await
            .map_err(unavailable)?;
        debug!("Stored session slot {}:{}", self.namespace, key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        conn.hdel::<_, _, ()>(&self.namespace, key)
            .await
            .map_err(unavailable)?;
        debug!("Removed session slot {}:{}", self.namespace, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_parses_url_without_connecting() {
        let storage = RedisSessionStorage::new("redis://127.0.0.1:6379").unwrap();
        assert_eq!(storage.namespace(), DEFAULT_NAMESPACE);

        let scoped = RedisSessionStorage::with_namespace("redis://127.0.0.1:6379", "qa").unwrap();
        assert_eq!(scoped.namespace(), "qa");
    }

    #[test]
    fn test_bad_url_is_unavailable() {
        assert!(matches!(
            RedisSessionStorage::new("not a redis url"),
            Err(StorageError::Unavailable(_))
        ));
    }
}
