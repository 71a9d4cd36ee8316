use crate::config::{ConfigError, env_or, env_required};

pub const DEFAULT_OIDC_ISSUER: &str = "https://accounts.google.com";

/// OAuth client registration at the identity provider.
#[derive(Clone)]
pub struct OidcConfig {
    /// Discovery is fetched from `{issuer}/.well-known/openid-configuration`.
    pub issuer: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfig")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl OidcConfig {
    /// `origin` supplies the default redirect URI, `{origin}/auth/callback`.
    pub fn from_env(origin: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            issuer: env_or("OIDC_ISSUER", DEFAULT_OIDC_ISSUER)
                .trim_end_matches('/')
                .to_string(),
            client_id: env_required("OIDC_CLIENT_ID")?,
            client_secret: env_required("OIDC_CLIENT_SECRET")?,
            redirect_uri: env_or(
                "OIDC_REDIRECT_URI",
                &format!("{}/auth/callback", origin.trim_end_matches('/')),
            ),
        })
    }
}
