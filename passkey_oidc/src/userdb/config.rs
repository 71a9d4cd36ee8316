use crate::config::ConfigError;
use crate::storage::StoreConfig;

#[derive(Debug, Clone)]
pub struct UserStoreConfig {
    pub store: StoreConfig,
    /// Expiry applied to every user and index record; `None` keeps them forever.
    pub record_ttl: Option<u64>,
}

impl UserStoreConfig {
    pub fn memory() -> Self {
        Self {
            store: StoreConfig::memory("user"),
            record_ttl: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let record_ttl = match std::env::var("USER_RECORD_TTL") {
            Ok(v) if !v.is_empty() => Some(v.parse::<u64>().map_err(|e| {
                ConfigError::Invalid("USER_RECORD_TTL".to_string(), e.to_string())
            })?),
            _ => None,
        };

        Ok(Self {
            store: StoreConfig::from_env("USER", "user")?,
            record_ttl,
        })
    }
}
