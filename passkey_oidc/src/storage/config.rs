use std::env;
use std::sync::Arc;

use super::errors::StorageError;
use super::types::{InMemoryKvStore, KvStore, RedisKvStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    Memory,
    Redis,
}

/// Which backend to build and where it lives.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub store_type: StoreType,
    pub url: Option<String>,
    /// Key prefix applied by shared backends so several stores can share one server.
    pub namespace: String,
}

impl StoreConfig {
    pub fn memory(namespace: &str) -> Self {
        Self {
            store_type: StoreType::Memory,
            url: None,
            namespace: namespace.to_string(),
        }
    }

    /// Reads `{prefix}_STORE_TYPE` and `{prefix}_STORE_URL`, e.g. `SESSION_STORE_TYPE`.
    pub fn from_env(prefix: &str, namespace: &str) -> Result<Self, StorageError> {
        let type_var = format!("{prefix}_STORE_TYPE");
        let url_var = format!("{prefix}_STORE_URL");

        let store_type = match env::var(&type_var).as_deref() {
            Err(_) | Ok("memory") => StoreType::Memory,
            Ok("redis") => StoreType::Redis,
            Ok(t) => {
                return Err(StorageError::Config(format!(
                    "Unsupported store type for {type_var}: {t}. Supported types are 'memory' and 'redis'"
                )));
            }
        };

        let url = env::var(&url_var).ok();
        if store_type == StoreType::Redis && url.is_none() {
            return Err(StorageError::Config(format!(
                "{url_var} must be set when {type_var}=redis"
            )));
        }

        Ok(Self {
            store_type,
            url,
            namespace: namespace.to_string(),
        })
    }
}

pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>, StorageError> {
    tracing::info!(
        "Initializing key-value store: type={:?}, namespace={}",
        config.store_type,
        config.namespace
    );

    let store: Arc<dyn KvStore> = match config.store_type {
        StoreType::Memory => Arc::new(InMemoryKvStore::new()),
        StoreType::Redis => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| StorageError::Config("Redis store requires a url".to_string()))?;
            Arc::new(RedisKvStore::connect(url, &config.namespace).await?)
        }
    };

    Ok(store)
}
