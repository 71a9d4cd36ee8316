use async_trait::async_trait;
use redis::AsyncCommands;

use super::errors::StorageError;
use super::types::{KvStore, RedisKvStore};

impl RedisKvStore {
    /// Connects to `url` and verifies the server answers before returning.
    pub async fn connect(url: &str, namespace: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        let _conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to redis key-value store, namespace={}", namespace);
        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(self.make_key(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = self.make_key(key);

        let _: () = conn.set(&key, value).await?;
        if let Some(ttl) = ttl {
            let _: () = conn.expire(&key, ttl as i64).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(self.make_key(key)).await?;
        Ok(())
    }
}
