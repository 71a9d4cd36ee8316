use crate::passkey::config::PasskeyConfig;
use crate::passkey::engine::PasskeyEngine;
use crate::passkey::errors::PasskeyError;
use crate::passkey::types::{AuthenticationOptions, AuthenticationResponse, CredentialDescriptor};
use crate::session::{Session, keys};
use crate::userdb::{Authenticator, UserRepository};
use crate::utils::{base64url_decode, gen_random_string, now_millis};

use super::cose::CosePublicKey;
use super::types::{AuthenticatorData, ParsedClientData};

impl PasskeyEngine {
    /// Starts an authentication ceremony for a known user.
    pub async fn generate_authentication_options(
        &self,
        session: &mut Session,
        user_name: &str,
    ) -> Result<AuthenticationOptions, PasskeyError> {
        if user_name.is_empty() {
            return Err(PasskeyError::Validation("userName is required".to_string()));
        }

        let user = self
            .users
            .get_user_by_name(user_name)
            .await?
            .ok_or_else(|| PasskeyError::UserNotFound(user_name.to_string()))?;

        let options = AuthenticationOptions {
            challenge: gen_random_string(32)?,
            timeout: self.config.timeout_millis(),
            rp_id: self.config.rp_id.clone(),
            allow_credentials: user
                .authenticators
                .iter()
                .map(|a| CredentialDescriptor {
                    id: a.id.clone(),
                    type_: "public-key".to_string(),
                    transports: vec!["internal".to_string()],
                })
                .collect(),
            user_verification: self.config.user_verification.clone(),
        };
        tracing::debug!("Auth options: {:?}", options);

        session
            .set_batch([
                (keys::CHALLENGE, options.challenge.as_str()),
                (keys::USER_NAME, user_name),
            ])
            .await?;

        Ok(options)
    }

    /// Verifies an assertion, advances the stored counter and logs the session in.
    pub async fn verify_authentication(
        &self,
        session: &mut Session,
        response: &AuthenticationResponse,
    ) -> Result<(), PasskeyError> {
        let user_name = session
            .get_str(keys::USER_NAME)
            .ok_or(PasskeyError::SessionStateMissing(keys::USER_NAME))?
            .to_string();

        let mut user = self
            .users
            .get_user_by_name(&user_name)
            .await?
            .ok_or_else(|| PasskeyError::UserNotFound(user_name.clone()))?;

        let challenge = session
            .get_str(keys::CHALLENGE)
            .ok_or(PasskeyError::SessionStateMissing(keys::CHALLENGE))?
            .to_string();

        let credential_id = base64url_decode(&response.id)
            .map_err(|_| PasskeyError::AuthenticatorNotRegistered)?;

        let stored = UserRepository::find_authenticator(&user.authenticators, &credential_id)
            .ok_or(PasskeyError::AuthenticatorNotRegistered)?;

        let new_counter = verify_authentication_response(&self.config, response, &challenge, stored)
            .map_err(|e| {
                if e.is_verification_failure() {
                    tracing::error!("Authentication verification failed: {}", e);
                    PasskeyError::SignatureInvalid
                } else {
                    e
                }
            })?;

        let stored_id = stored.id.clone();
        if let Some(authenticator) = user.authenticators.iter_mut().find(|a| a.id == stored_id) {
            authenticator.counter = new_counter;
            authenticator.updated_at = now_millis();
        }
        self.users.set_user(&user).await?;

        session.set(keys::LOGGED_IN, true).await?;
        session.delete(keys::CHALLENGE).await?;

        tracing::info!("Authenticated user {}", user.id);
        Ok(())
    }
}

/// Returns the authenticator's new signature counter.
pub(super) fn verify_authentication_response(
    config: &PasskeyConfig,
    response: &AuthenticationResponse,
    expected_challenge: &str,
    stored: &Authenticator,
) -> Result<u32, PasskeyError> {
    if response.id != response.raw_id {
        return Err(PasskeyError::Verification(
            "Credential id does not match rawId".to_string(),
        ));
    }

    let client_data = ParsedClientData::from_base64(&response.response.client_data_json)?;
    client_data.verify("webauthn.get", expected_challenge, config)?;
    tracing::debug!("Parsed client data: {:?}", client_data);

    let auth_data = AuthenticatorData::from_base64(&response.response.authenticator_data)?;
    auth_data.verify(config)?;

    verify_counter(stored.counter, auth_data.counter)?;

    let public_key = CosePublicKey::from_cose(
        &base64url_decode(&stored.public_key)
            .map_err(|e| PasskeyError::Format(format!("Stored public key: {e}")))?,
    )?;
    let signature = base64url_decode(&response.response.signature)
        .map_err(|e| PasskeyError::Format(format!("Invalid signature encoding: {e}")))?;

    let mut signed_data = auth_data.raw_data.clone();
    signed_data.extend_from_slice(client_data.hash().as_ref());

    public_key.verify(&signed_data, &signature)?;

    Ok(auth_data.counter)
}

/// A counter of zero on both sides means the authenticator does not count.
/// Otherwise the new value must be strictly greater than the stored one.
pub(super) fn verify_counter(stored: u32, received: u32) -> Result<(), PasskeyError> {
    if (received > 0 || stored > 0) && received <= stored {
        tracing::warn!(
            "Counter did not increase: stored={}, received={}",
            stored,
            received
        );
        return Err(PasskeyError::Counter(
            "Counter value did not increase. For more details, run with RUST_LOG=debug".into(),
        ));
    }
    Ok(())
}
