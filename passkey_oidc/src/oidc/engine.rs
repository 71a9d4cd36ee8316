use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::userdb::UserRepository;

use super::config::OidcConfig;
use super::discovery::{OidcDiscoveryDocument, fetch_oidc_discovery};
use super::errors::OidcError;

/// Authorization-code + PKCE login against one OpenID provider.
///
/// The HTTP client is injected so the caller decides timeouts and proxies.
/// See [`authorization_url`](Self::authorization_url) and
/// [`handle_callback`](Self::handle_callback).
#[derive(Clone)]
pub struct OidcEngine {
    pub(super) config: OidcConfig,
    pub(super) client: reqwest::Client,
    pub(super) users: UserRepository,
    discovery: Arc<OnceCell<OidcDiscoveryDocument>>,
}

impl OidcEngine {
    pub fn new(config: OidcConfig, client: reqwest::Client, users: UserRepository) -> Self {
        Self {
            config,
            client,
            users,
            discovery: Arc::new(OnceCell::new()),
        }
    }

    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Fetched on first use and kept for the engine's lifetime. A failed
    /// fetch is retried on the next call.
    pub(super) async fn discovery(&self) -> Result<&OidcDiscoveryDocument, OidcError> {
        self.discovery
            .get_or_try_init(|| fetch_oidc_discovery(&self.client, &self.config.issuer))
            .await
    }
}
