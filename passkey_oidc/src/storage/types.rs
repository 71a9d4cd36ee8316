use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::errors::StorageError;

/// Durable string-keyed storage with optional per-item expiry.
///
/// Values are opaque strings; callers serialize their own records. A `ttl` of
/// `None` keeps the item until it is deleted. There is no multi-key
/// transaction: each call stands alone and concurrent writers to the same key
/// resolve as last-write-wins.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Fetch the value stored under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite `key`, expiring after `ttl` seconds when given.
    async fn put(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub(super) struct MemoryEntry {
    pub(super) value: String,
    pub(super) expires_at: Option<Instant>,
}

pub struct InMemoryKvStore {
    pub(super) entry: Mutex<HashMap<String, MemoryEntry>>,
}

pub struct RedisKvStore {
    pub(super) client: redis::Client,
    pub(super) namespace: String,
}
