//! A software authenticator that produces browser-shaped ceremony responses.

use ciborium::value::Value as CborValue;
use ring::digest;
use serde_json::json;

use super::cose::test_keys::TestKey;
use super::types::auth_data_flags;
use crate::passkey::config::PasskeyConfig;
use crate::passkey::types::{
    AssertionResponse, AttestationResponse, AuthenticationResponse, RegistrationResponse,
};
use crate::utils::base64url_encode;

pub(crate) struct SoftAuthenticator {
    key: TestKey,
    pub(crate) credential_id: Vec<u8>,
    pub(crate) flags: u8,
}

impl SoftAuthenticator {
    pub(crate) fn new(credential_id: &[u8]) -> Self {
        Self {
            key: TestKey::generate(),
            credential_id: credential_id.to_vec(),
            flags: auth_data_flags::UP | auth_data_flags::UV,
        }
    }

    pub(crate) fn client_data(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
        json!({"type": type_, "challenge": challenge, "origin": origin, "crossOrigin": false})
            .to_string()
            .into_bytes()
    }

    fn auth_data(&self, rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
        let mut data = digest::digest(&digest::SHA256, rp_id.as_bytes())
            .as_ref()
            .to_vec();
        data.push(flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data
    }

    /// Attestation `none` unless `packed_self` asks for a self-signed packed statement.
    pub(crate) fn register(
        &self,
        config: &PasskeyConfig,
        challenge: &str,
        counter: u32,
        packed_self: bool,
    ) -> RegistrationResponse {
        let client_data = Self::client_data("webauthn.create", challenge, &config.origin);

        let mut auth_data = self.auth_data(&config.rp_id, self.flags | auth_data_flags::AT, counter);
        auth_data.extend_from_slice(&[0u8; 16]);
        auth_data.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&self.credential_id);
        auth_data.extend_from_slice(&self.key.cose());

        let (fmt, att_stmt) = if packed_self {
            let mut signed = auth_data.clone();
            signed.extend_from_slice(digest::digest(&digest::SHA256, &client_data).as_ref());
            (
                "packed",
                vec![
                    (CborValue::Text("alg".into()), CborValue::Integer((-7).into())),
                    (
                        CborValue::Text("sig".into()),
                        CborValue::Bytes(self.key.sign(&signed)),
                    ),
                ],
            )
        } else {
            ("none", vec![])
        };

        let object = CborValue::Map(vec![
            (CborValue::Text("fmt".into()), CborValue::Text(fmt.into())),
            (CborValue::Text("attStmt".into()), CborValue::Map(att_stmt)),
            (CborValue::Text("authData".into()), CborValue::Bytes(auth_data)),
        ]);
        let mut object_bytes = Vec::new();
        ciborium::ser::into_writer(&object, &mut object_bytes).unwrap();

        let id = base64url_encode(&self.credential_id);
        RegistrationResponse {
            id: id.clone(),
            raw_id: id,
            response: AttestationResponse {
                client_data_json: base64url_encode(&client_data),
                attestation_object: base64url_encode(&object_bytes),
                transports: vec!["internal".to_string()],
            },
            type_: "public-key".to_string(),
            authenticator_attachment: Some("platform".to_string()),
        }
    }

    pub(crate) fn authenticate(
        &self,
        config: &PasskeyConfig,
        challenge: &str,
        counter: u32,
    ) -> AuthenticationResponse {
        let client_data = Self::client_data("webauthn.get", challenge, &config.origin);
        let auth_data = self.auth_data(&config.rp_id, self.flags, counter);

        let mut signed = auth_data.clone();
        signed.extend_from_slice(digest::digest(&digest::SHA256, &client_data).as_ref());

        let id = base64url_encode(&self.credential_id);
        AuthenticationResponse {
            id: id.clone(),
            raw_id: id,
            response: AssertionResponse {
                client_data_json: base64url_encode(&client_data),
                authenticator_data: base64url_encode(&auth_data),
                signature: base64url_encode(&self.key.sign(&signed)),
                user_handle: None,
            },
            type_: "public-key".to_string(),
        }
    }
}
