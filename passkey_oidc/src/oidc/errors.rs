use thiserror::Error;

use crate::session::SessionError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors from the authorization-code flow. The callback boundary turns any of
/// these into a redirect carrying the message.
#[derive(Debug, Error)]
pub enum OidcError {
    /// The provider returned an OAuth2 error, or a response that does not fit
    /// the expected schema
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("State mismatch")]
    StateMismatch,

    #[error("Nonce mismatch")]
    NonceMismatch,

    /// `state`, `nonce` or `code_verifier` was not in the session
    #[error("No {0} found in session")]
    SessionStateMissing(&'static str),

    /// JWKS has no key with the ID token's `kid`
    #[error("Public key related with kid was not found: {0}")]
    KeyNotFound(String),

    /// ID token signature or claim validation failed
    #[error("Invalid ID token: {0}")]
    Signature(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<reqwest::Error> for OidcError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<SessionError> for OidcError {
    fn from(err: SessionError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<UserError> for OidcError {
    fn from(err: UserError) -> Self {
        Self::Storage(err.to_string())
    }
}
