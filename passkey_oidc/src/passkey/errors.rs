use thiserror::Error;

use crate::session::SessionError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors that can occur during WebAuthn/Passkey operations.
///
/// The first group is what the ceremony methods on
/// [`PasskeyEngine`](super::PasskeyEngine) return to callers. The second group
/// is produced while parsing and verifying a browser response; the engine logs
/// those and reports them as [`PasskeyError::SignatureInvalid`].
#[derive(Debug, Error)]
pub enum PasskeyError {
    /// Malformed or missing request input, e.g. an empty user name
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("User is already registered: {0}")]
    AlreadyRegistered(String),

    /// The session holds no `userName` or `challenge` for this ceremony
    #[error("No {0} found in session")]
    SessionStateMissing(&'static str),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Authenticator is not registered")]
    AuthenticatorNotRegistered,

    /// Deliberately carries no detail
    #[error("Can not validate response signature")]
    SignatureInvalid,

    /// Error validating the client data JSON from the browser
    #[error("Invalid client data: {0}")]
    ClientData(String),

    /// Error parsing or validating the authenticator data structure
    #[error("Invalid authenticator data: {0}")]
    AuthenticatorData(String),

    /// Error during cryptographic verification of WebAuthn assertions
    #[error("Verification error: {0}")]
    Verification(String),

    /// Stored counter did not increase
    #[error("Counter error: {0}")]
    Counter(String),

    /// Error with improperly formatted data
    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl PasskeyError {
    /// True for the errors raised while checking a browser response.
    pub(crate) fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::ClientData(_)
                | Self::AuthenticatorData(_)
                | Self::Verification(_)
                | Self::Counter(_)
                | Self::Format(_)
        )
    }
}

impl From<UserError> for PasskeyError {
    fn from(err: UserError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<SessionError> for PasskeyError {
    fn from(err: SessionError) -> Self {
        Self::Storage(err.to_string())
    }
}
