use crate::passkey::config::PasskeyConfig;
use crate::passkey::engine::PasskeyEngine;
use crate::passkey::errors::PasskeyError;
use crate::passkey::types::{
    AuthenticatorSelection, CredentialDescriptor, PubKeyCredParam, RegistrationOptions,
    RegistrationResponse, RelyingParty, UserEntity,
};
use crate::session::{Session, keys};
use crate::userdb::{Authenticator, User, UserRepository};
use crate::utils::{base64url_encode, gen_random_string, now_millis};

use super::attestation::verify_attestation;
use super::cose::{CosePublicKey, ES256_ALG, RS256_ALG};
use super::types::{
    AttestedCredential, AuthenticatorData, ParsedClientData, parse_attestation_object,
};
use super::useragent::os_from_user_agent;

/// What a valid attestation proves about the new credential.
#[derive(Debug)]
pub(super) struct VerifiedRegistration {
    pub(super) credential_id: Vec<u8>,
    pub(super) public_key: Vec<u8>,
    pub(super) counter: u32,
}

impl PasskeyEngine {
    /// Starts a registration ceremony for `user_name`.
    ///
    /// An unknown name gets a fresh, unregistered user which is saved right away
    /// so the verification step can find it.
    pub async fn generate_registration_options(
        &self,
        session: &mut Session,
        user_name: &str,
    ) -> Result<RegistrationOptions, PasskeyError> {
        if user_name.is_empty() {
            return Err(PasskeyError::Validation("userName is required".to_string()));
        }

        let user = match self.users.get_user_by_name(user_name).await? {
            Some(user) => user,
            None => User::new(UserRepository::new_user_id()?, user_name.to_string()),
        };

        if user.registered {
            return Err(PasskeyError::AlreadyRegistered(user_name.to_string()));
        }

        let options = registration_options(&self.config, &user)?;
        tracing::debug!("Registration options: {:?}", options);

        self.users.set_user(&user).await?;
        session
            .set_batch([
                (keys::CHALLENGE, options.challenge.as_str()),
                (keys::USER_NAME, user_name),
            ])
            .await?;

        Ok(options)
    }

    /// Completes a registration ceremony and marks the session as logged in.
    pub async fn verify_registration(
        &self,
        session: &mut Session,
        response: &RegistrationResponse,
        user_agent: Option<&str>,
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

        let verified = verify_registration_response(&self.config, response, &challenge)
            .map_err(|e| {
                if e.is_verification_failure() {
                    tracing::error!("Registration verification failed: {}", e);
                    PasskeyError::SignatureInvalid
                } else {
                    e
                }
            })?;

        if UserRepository::find_authenticator(&user.authenticators, &verified.credential_id)
            .is_none()
        {
            let (os_name, os_version) = os_from_user_agent(user_agent);
            let now = now_millis();
            let authenticator = Authenticator {
                id: base64url_encode(&verified.credential_id),
                public_key: base64url_encode(&verified.public_key),
                counter: verified.counter,
                os_name,
                os_version,
                created_at: now,
                updated_at: now,
                transports: response.response.transports.clone(),
            };
            self.users
                .put_authenticator_id_user_id(&authenticator.id, &user.id)
                .await?;
            user.authenticators.push(authenticator);
        } else {
            tracing::debug!("Credential already stored for user {}", user.id);
        }

        user.registered = true;
        self.users.set_user(&user).await?;

        session.delete(keys::CHALLENGE).await?;
        session.set(keys::LOGGED_IN, true).await?;

        tracing::info!("Registered passkey for user {}", user.id);
        Ok(())
    }
}

fn registration_options(
    config: &PasskeyConfig,
    user: &User,
) -> Result<RegistrationOptions, PasskeyError> {
    let exclude_credentials = user
        .authenticators
        .iter()
        .map(|a| CredentialDescriptor {
            id: a.id.clone(),
            type_: "public-key".to_string(),
            transports: a.transports.clone(),
        })
        .collect();

    Ok(RegistrationOptions {
        challenge: gen_random_string(32)?,
        rp: RelyingParty {
            name: config.rp_name.clone(),
            id: config.rp_id.clone(),
        },
        user: UserEntity {
            id: base64url_encode(user.id.as_bytes()),
            name: user.name.clone(),
            display_name: user.name.clone(),
        },
        pub_key_cred_params: [ES256_ALG, RS256_ALG]
            .into_iter()
            .map(|alg| PubKeyCredParam {
                type_: "public-key".to_string(),
                alg,
            })
            .collect(),
        timeout: config.timeout_millis(),
        attestation: "none".to_string(),
        exclude_credentials,
        authenticator_selection: AuthenticatorSelection {
            authenticator_attachment: "platform".to_string(),
            resident_key: "required".to_string(),
            require_resident_key: true,
            user_verification: config.user_verification.clone(),
        },
    })
}

/// Checks clientDataJSON, authenticator data and the attestation statement.
pub(super) fn verify_registration_response(
    config: &PasskeyConfig,
    response: &RegistrationResponse,
    expected_challenge: &str,
) -> Result<VerifiedRegistration, PasskeyError> {
    let client_data = ParsedClientData::from_base64(&response.response.client_data_json)?;
    client_data.verify("webauthn.create", expected_challenge, config)?;

    let attestation = parse_attestation_object(&response.response.attestation_object)?;
    let auth_data = AuthenticatorData::from_bytes(attestation.auth_data.clone())?;
    auth_data.verify(config)?;

    let credential = AttestedCredential::parse(&auth_data)?;
    if base64url_encode(&credential.credential_id) != response.raw_id {
        return Err(PasskeyError::Verification(
            "Credential ID does not match rawId".to_string(),
        ));
    }

    let public_key = CosePublicKey::from_cose(&credential.cose_key)?;
    verify_attestation(&attestation, client_data.hash().as_ref(), &public_key)?;

    Ok(VerifiedRegistration {
        credential_id: credential.credential_id,
        public_key: credential.cose_key,
        counter: auth_data.counter,
    })
}
