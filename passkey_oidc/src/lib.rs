//! passkey_oidc - passkey (WebAuthn) and OIDC login backed by a key-value store
//!
//! The crate has no HTTP framework dependency. Every component is a plain value
//! built from its config and the collaborators it needs:
//!
//! - [`storage`]: the [`KvStore`] trait with in-memory and Redis adapters
//! - [`session`]: a per-browser [`Session`] over a `KvStore`, plus cookie helpers
//! - [`userdb`]: the [`UserRepository`] keeping users and their secondary indices
//! - [`passkey`]: the [`PasskeyEngine`] registration and authentication ceremonies
//! - [`oidc`]: the [`OidcEngine`] authorization-code + PKCE flow

mod config;
pub mod oidc;
pub mod passkey;
pub mod session;
pub mod storage;
pub mod userdb;
mod utils;

pub use config::{AuthConfig, ConfigError};

pub use oidc::{CallbackParams, OidcConfig, OidcEngine, OidcError};
pub use passkey::{
    AuthenticationOptions, AuthenticationResponse, PasskeyConfig, PasskeyEngine, PasskeyError,
    RegistrationOptions, RegistrationResponse,
};
pub use session::{
    Loaded, Session, SessionConfig, SessionError, SessionValue, Unloaded,
    expired_session_cookie_header, new_session_id, session_cookie_header, session_id_from_headers,
};
pub use storage::{KvStore, StorageError, StoreConfig, build_store};
pub use userdb::{Authenticator, OidcAccount, User, UserError, UserRepository, UserStoreConfig};
pub use utils::{UtilError, base64url_decode, base64url_encode, gen_random_string};
