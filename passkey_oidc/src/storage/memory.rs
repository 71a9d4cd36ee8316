use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::errors::StorageError;
use super::types::{InMemoryKvStore, KvStore, MemoryEntry};

impl InMemoryKvStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory key-value store");
        Self {
            entry: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.entry.lock().await;

        let expired = match entries.get(key) {
            Some(MemoryEntry {
                expires_at: Some(at),
                ..
            }) => *at <= Instant::now(),
            Some(_) => false,
            None => return Ok(None),
        };

        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), StorageError> {
        let expires_at = ttl.map(|secs| Instant::now() + Duration::from_secs(secs));
        self.entry.lock().await.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entry.lock().await.remove(key);
        Ok(())
    }
}
