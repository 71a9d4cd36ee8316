mod config;
mod discovery;
mod engine;
mod errors;
mod main;
mod types;

pub use config::{DEFAULT_OIDC_ISSUER, OidcConfig};
pub use discovery::OidcDiscoveryDocument;
pub use engine::OidcEngine;
pub use errors::OidcError;
pub use types::CallbackParams;
