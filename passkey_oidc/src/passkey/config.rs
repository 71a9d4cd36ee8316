use crate::config::{ConfigError, env_or, env_parse_or, env_required};

/// Relying-party settings for both ceremonies.
#[derive(Debug, Clone)]
pub struct PasskeyConfig {
    /// Expected `origin` in clientDataJSON, e.g. `https://example.com`.
    pub origin: String,
    /// Hashed into `rpIdHash`; a registrable suffix of the origin host.
    pub rp_id: String,
    pub rp_name: String,
    /// Client-side ceremony timeout in seconds.
    pub timeout: u32,
    /// `required`, `preferred` or `discouraged`.
    pub user_verification: String,
}

impl PasskeyConfig {
    pub fn new(origin: &str, rp_name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            rp_id: rp_id_from_origin(origin)?,
            rp_name: rp_name.to_string(),
            timeout: 60,
            user_verification: "preferred".to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let origin = env_required("ORIGIN")?;
        let mut config = Self::new(&origin, &env_or("PASSKEY_RP_NAME", "Passkey demo"))?;

        if let Ok(rp_id) = std::env::var("PASSKEY_RP_ID") {
            if !rp_id.is_empty() {
                config.rp_id = rp_id;
            }
        }
        config.timeout = env_parse_or("PASSKEY_TIMEOUT", 60)?;
        config.user_verification =
            match env_or("PASSKEY_USER_VERIFICATION", "preferred").to_lowercase().as_str() {
                v @ ("required" | "preferred" | "discouraged") => v.to_string(),
                invalid => {
                    tracing::warn!(
                        "Invalid user verification: {}. Using default 'preferred'",
                        invalid
                    );
                    "preferred".to_string()
                }
            };

        Ok(config)
    }

    pub(crate) fn timeout_millis(&self) -> u64 {
        u64::from(self.timeout) * 1000
    }

    pub(crate) fn user_verification_required(&self) -> bool {
        self.user_verification == "required"
    }
}

fn rp_id_from_origin(origin: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(origin)
        .map_err(|e| ConfigError::Invalid("ORIGIN".to_string(), e.to_string()))?;
    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Invalid("ORIGIN".to_string(), "origin has no host".into()))
}
