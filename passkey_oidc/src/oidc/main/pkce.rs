use sha2::{Digest, Sha256};

use crate::utils::{UtilError, base64url_encode, gen_random_string};

/// Values generated at authorization start; all three are stored in the session.
#[derive(Debug)]
pub(super) struct AuthRequestSecrets {
    pub(super) code_verifier: String,
    pub(super) state: String,
    pub(super) nonce: String,
}

impl AuthRequestSecrets {
    pub(super) fn generate() -> Result<Self, UtilError> {
        Ok(Self {
            code_verifier: gen_random_string(32)?,
            state: gen_random_string(32)?,
            nonce: gen_random_string(32)?,
        })
    }

    pub(super) fn code_challenge(&self) -> String {
        s256_challenge(&self.code_verifier)
    }
}

/// `BASE64URL(SHA256(verifier))`, the `S256` method.
pub(super) fn s256_challenge(code_verifier: &str) -> String {
    base64url_encode(&Sha256::digest(code_verifier.as_bytes()))
}
