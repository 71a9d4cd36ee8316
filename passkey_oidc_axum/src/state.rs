use std::sync::Arc;

use passkey_oidc::{
    AuthConfig, KvStore, OidcEngine, PasskeyEngine, SessionConfig, StorageError, UserRepository,
    build_store,
};

/// Shared state behind every route: the two engines plus what the session
/// middleware needs to resolve cookies.
#[derive(Clone)]
pub struct AuthState {
    pub passkey: PasskeyEngine,
    /// `None` disables `/auth/*`.
    pub oidc: Option<OidcEngine>,
    pub session_store: Arc<dyn KvStore>,
    pub session_config: SessionConfig,
}

impl AuthState {
    pub fn new(
        passkey: PasskeyEngine,
        oidc: Option<OidcEngine>,
        session_store: Arc<dyn KvStore>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            passkey,
            oidc,
            session_store,
            session_config,
        }
    }

    /// Connects both stores and wires the engines. `client` is used for every
    /// call to the identity provider.
    pub async fn from_config(
        config: &AuthConfig,
        client: reqwest::Client,
    ) -> Result<Self, StorageError> {
        let session_store = build_store(&config.session_store).await?;
        let user_store = build_store(&config.user_store.store).await?;
        let users = UserRepository::new(user_store, config.user_store.record_ttl);

        let passkey = PasskeyEngine::new(config.passkey.clone(), users.clone());
        let oidc = config
            .oidc
            .clone()
            .map(|oidc| OidcEngine::new(oidc, client, users));

        tracing::info!(
            "Auth state ready (oidc {})",
            if oidc.is_some() { "enabled" } else { "disabled" }
        );
        Ok(Self::new(
            passkey,
            oidc,
            session_store,
            config.session.clone(),
        ))
    }
}
