use crate::config::{ConfigError, env_or, env_parse_or};
use crate::utils::gen_random_string;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "__session";
/// 24 hours.
pub const DEFAULT_SESSION_TTL: u64 = 60 * 60 * 24;

#[derive(Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Sliding expiry in seconds, also used as the cookie `Max-Age`.
    pub ttl: u64,
    /// HMAC key for signing the cookie value.
    pub secret: Vec<u8>,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("cookie_name", &self.cookie_name)
            .field("ttl", &self.ttl)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SessionConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            ttl: DEFAULT_SESSION_TTL,
            secret: secret.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ => {
                tracing::warn!(
                    "SESSION_SECRET is not set; using a random per-process key, sessions will not survive restarts"
                );
                gen_random_string(32)
                    .map_err(|e| ConfigError::Invalid("SESSION_SECRET".to_string(), e.to_string()))?
                    .into_bytes()
            }
        };

        Ok(Self {
            cookie_name: env_or("SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE_NAME),
            ttl: env_parse_or("SESSION_TTL", DEFAULT_SESSION_TTL)?,
            secret,
        })
    }
}
