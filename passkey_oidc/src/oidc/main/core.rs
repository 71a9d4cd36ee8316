use crate::oidc::engine::OidcEngine;
use crate::oidc::errors::OidcError;
use crate::oidc::types::CallbackParams;
use crate::session::{Session, SessionValue, keys};
use crate::userdb::{OidcAccount, User, UserRepository};
use crate::utils::now_millis;

use super::idtoken::verify_idtoken;
use super::pkce::AuthRequestSecrets;
use super::token::exchange_code_for_token;

impl OidcEngine {
    /// Generates PKCE verifier, `state` and `nonce`, stores them in the session
    /// and returns the provider URL the browser should open.
    pub async fn authorization_url(&self, session: &mut Session) -> Result<String, OidcError> {
        let discovery = self.discovery().await?;
        let secrets = AuthRequestSecrets::generate()?;
        let code_challenge = secrets.code_challenge();

        let url = url::Url::parse_with_params(
            &discovery.authorization_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("scope", "openid email"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("ux_mode", "popup"),
                ("state", secrets.state.as_str()),
                ("nonce", secrets.nonce.as_str()),
                ("code_challenge", code_challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| OidcError::Provider(format!("Invalid authorization endpoint: {e}")))?;

        session
            .set_batch([
                (keys::STATE, secrets.state.as_str()),
                (keys::NONCE, secrets.nonce.as_str()),
                (keys::CODE_VERIFIER, secrets.code_verifier.as_str()),
            ])
            .await?;

        tracing::debug!("Auth URL: {}", url);
        Ok(url.into())
    }

    /// Completes the flow and returns the signed-in user name (the email claim).
    ///
    /// `state`, `nonce` and `code_verifier` are removed from the session before
    /// anything else, so a callback can never be replayed.
    pub async fn handle_callback(
        &self,
        session: &mut Session,
        params: CallbackParams,
    ) -> Result<String, OidcError> {
        let mut stored = session
            .delete_batch(&[keys::STATE, keys::NONCE, keys::CODE_VERIFIER])
            .await?;
        let mut take = |key: &'static str| {
            stored
                .remove(key)
                .and_then(|v| v.as_str().map(str::to_string))
                .ok_or(OidcError::SessionStateMissing(key))
        };

        let expected_state = take(keys::STATE)?;
        if params.state.as_deref() != Some(expected_state.as_str()) {
            tracing::warn!("State parameter does not match the session");
            return Err(OidcError::StateMismatch);
        }

        if let Some(error) = params.error {
            tracing::warn!("Provider returned error: {}", error);
            return Err(OidcError::Provider(format!(
                "[{}] {}",
                error,
                params.error_description.unwrap_or_default()
            )));
        }

        let nonce = take(keys::NONCE)?;
        let code_verifier = take(keys::CODE_VERIFIER)?;

        let code = params
            .code
            .ok_or_else(|| OidcError::Provider("Authorization response has no code".to_string()))?;

        let discovery = self.discovery().await?;
        let id_token = exchange_code_for_token(
            &self.client,
            &self.config,
            &discovery.token_endpoint,
            &code,
            &code_verifier,
        )
        .await?;

        let claims = verify_idtoken(
            &self.client,
            &id_token,
            &discovery.jwks_uri,
            &discovery.issuer,
            &self.config.client_id,
        )
        .await?;

        if claims.nonce.as_deref() != Some(nonce.as_str()) {
            tracing::warn!("Nonce in ID token does not match the session");
            return Err(OidcError::NonceMismatch);
        }

        let email = claims
            .email
            .ok_or_else(|| OidcError::Provider("ID token has no email claim".to_string()))?;

        let now = now_millis();
        let user = match self.users.get_user_by_name(&email).await? {
            Some(mut user) => {
                match user.oidc_account.as_mut() {
                    Some(account) => account.updated_at = now,
                    None => {
                        user.oidc_account = Some(OidcAccount {
                            iss: claims.iss,
                            sub: claims.sub,
                            created_at: now,
                            updated_at: now,
                        })
                    }
                }
                user
            }
            None => {
                let mut user = User::new(UserRepository::new_user_id()?, email.clone());
                user.oidc_account = Some(OidcAccount {
                    iss: claims.iss,
                    sub: claims.sub,
                    created_at: now,
                    updated_at: now,
                });
                tracing::info!("Created user {} from OIDC login", user.id);
                user
            }
        };
        self.users.set_user(&user).await?;

        session
            .set_batch([
                (keys::LOGGED_IN, SessionValue::from(true)),
                (keys::USER_NAME, SessionValue::from(email.as_str())),
            ])
            .await?;

        tracing::info!("OIDC login completed for user {}", user.id);
        Ok(email)
    }
}
