mod config;
mod engine;
mod errors;
mod main;
mod types;

pub use config::PasskeyConfig;
pub use engine::PasskeyEngine;
pub use errors::PasskeyError;
pub use types::{
    AssertionResponse, AttestationResponse, AuthenticationOptions, AuthenticationResponse,
    AuthenticatorSelection, CredentialDescriptor, PubKeyCredParam, RegistrationOptions,
    RegistrationResponse, RelyingParty, UserEntity,
};
