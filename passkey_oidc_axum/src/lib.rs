//! Axum routes for the passkey and OIDC flows of `passkey-oidc`.
//!
//! [`router`] mounts everything behind [`session_layer`]. The individual
//! routers are public so an application can mount them elsewhere, as long as
//! the session middleware wraps them.

mod auth;
mod error;
mod oidc;
mod passkey;
mod router;
mod session;
mod state;

pub use auth::auth_router;
pub use error::{ErrorResponse, IntoResponseError};
pub use oidc::oidc_router;
pub use passkey::passkey_router;
pub use router::router;
pub use session::{AuthSession, session_layer};
pub use state::AuthState;
