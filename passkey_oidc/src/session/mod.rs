mod config;
mod errors;
mod main;
mod types;

pub use config::SessionConfig;
pub use errors::SessionError;
pub use main::{
    Loaded, Session, SessionState, Unloaded, expired_session_cookie_header, new_session_id,
    session_cookie_header, session_id_from_headers, sign_session_id, verify_signed_session_id,
};
pub use types::{SessionData, SessionValue};

/// Session keys written by the ceremonies.
pub mod keys {
    pub const CHALLENGE: &str = "challenge";
    pub const USER_NAME: &str = "userName";
    pub const STATE: &str = "state";
    pub const NONCE: &str = "nonce";
    pub const CODE_VERIFIER: &str = "code_verifier";
    pub const LOGGED_IN: &str = "loggedIn";
}
