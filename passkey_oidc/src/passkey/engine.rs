use crate::userdb::{Authenticator, UserRepository};

use super::config::PasskeyConfig;
use super::errors::PasskeyError;

/// Runs WebAuthn registration and authentication ceremonies against a
/// [`UserRepository`]. Ceremony state lives in the caller's session.
///
/// The ceremony methods are defined alongside their verification code:
/// [`generate_registration_options`](Self::generate_registration_options),
/// [`verify_registration`](Self::verify_registration),
/// [`generate_authentication_options`](Self::generate_authentication_options) and
/// [`verify_authentication`](Self::verify_authentication).
#[derive(Clone)]
pub struct PasskeyEngine {
    pub(super) config: PasskeyConfig,
    pub(super) users: UserRepository,
}

impl PasskeyEngine {
    pub fn new(config: PasskeyConfig, users: UserRepository) -> Self {
        Self { config, users }
    }

    pub fn config(&self) -> &PasskeyConfig {
        &self.config
    }

    /// Deletes the user and all of its index entries. Unknown names succeed.
    pub async fn unregister(&self, user_name: &str) -> Result<(), PasskeyError> {
        if user_name.is_empty() {
            return Err(PasskeyError::Validation("userName is required".to_string()));
        }
        self.users.delete_user_by_name(user_name).await?;
        tracing::info!("Unregistered user {}", user_name);
        Ok(())
    }

    pub async fn list_authenticators(
        &self,
        user_name: &str,
    ) -> Result<Vec<Authenticator>, PasskeyError> {
        let user = self
            .users
            .get_user_by_name(user_name)
            .await?
            .ok_or_else(|| PasskeyError::UserNotFound(user_name.to_string()))?;
        Ok(user.authenticators)
    }
}
