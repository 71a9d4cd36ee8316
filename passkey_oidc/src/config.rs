//! Configuration loading shared by every component.
//!
//! Each component owns a plain config struct with a `from_env()` constructor.
//! [`AuthConfig`] gathers them so a binary can read the whole environment once
//! and hand the pieces to the components it builds.

use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::oidc::OidcConfig;
use crate::passkey::PasskeyConfig;
use crate::session::SessionConfig;
use crate::storage::{StorageError, StoreConfig};
use crate::userdb::UserStoreConfig;

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {0}: {1}")]
    Invalid(String, String),

    #[error("Store configuration error: {0}")]
    Store(#[from] StorageError),
}

pub(crate) fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn env_required(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing(name.to_string()))
}

pub(crate) fn env_parse_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(v) if !v.is_empty() => v
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(name.to_string(), e.to_string())),
        _ => Ok(default),
    }
}

/// Everything the authentication core needs, read from the environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub passkey: PasskeyConfig,
    /// `None` when `OIDC_CLIENT_ID` is not set; the OIDC routes are then disabled.
    pub oidc: Option<OidcConfig>,
    pub session: SessionConfig,
    pub session_store: StoreConfig,
    pub user_store: UserStoreConfig,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let passkey = PasskeyConfig::from_env()?;
        let oidc = if env::var("OIDC_CLIENT_ID").is_ok_and(|v| !v.is_empty()) {
            Some(OidcConfig::from_env(&passkey.origin)?)
        } else {
            tracing::warn!("OIDC_CLIENT_ID is not set; OIDC login is disabled");
            None
        };

        Ok(Self {
            passkey,
            oidc,
            session: SessionConfig::from_env()?,
            session_store: StoreConfig::from_env("SESSION", "session")?,
            user_store: UserStoreConfig::from_env()?,
        })
    }
}
