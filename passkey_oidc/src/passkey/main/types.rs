use ciborium::value::Value as CborValue;
use ring::digest;
use serde::Deserialize;

use crate::passkey::config::PasskeyConfig;
use crate::passkey::errors::PasskeyError;
use crate::utils::base64url_decode;

#[derive(Debug)]
pub(super) struct AttestationObject {
    pub(super) fmt: String,
    pub(super) auth_data: Vec<u8>,
    pub(super) att_stmt: Vec<(CborValue, CborValue)>,
}

#[derive(Deserialize, Debug)]
struct ClientDataJson {
    #[serde(rename = "type")]
    type_: String,
    challenge: String,
    origin: String,
}

#[derive(Debug)]
pub(super) struct ParsedClientData {
    pub(super) challenge: String,
    pub(super) origin: String,
    pub(super) type_: String,
    pub(super) raw_data: Vec<u8>,
}

impl ParsedClientData {
    pub(super) fn from_base64(client_data_json: &str) -> Result<Self, PasskeyError> {
        let raw_data = base64url_decode(client_data_json)
            .map_err(|e| PasskeyError::Format(format!("Failed to decode: {e}")))?;

        let data: ClientDataJson = serde_json::from_slice(&raw_data)
            .map_err(|e| PasskeyError::ClientData(format!("Invalid JSON: {e}")))?;

        Ok(Self {
            challenge: data.challenge,
            origin: data.origin,
            type_: data.type_,
            raw_data,
        })
    }

    /// Checks type (`webauthn.create` / `webauthn.get`), challenge and origin.
    pub(super) fn verify(
        &self,
        expected_type: &str,
        stored_challenge: &str,
        config: &PasskeyConfig,
    ) -> Result<(), PasskeyError> {
        if self.type_ != expected_type {
            return Err(PasskeyError::ClientData(format!(
                "Invalid type. Expected '{}', Got: {}",
                expected_type, self.type_
            )));
        }

        if self.challenge != stored_challenge {
            return Err(PasskeyError::ClientData(
                "Challenge mismatch. For more details, run with RUST_LOG=debug".into(),
            ));
        }

        if self.origin != config.origin {
            return Err(PasskeyError::ClientData(format!(
                "Invalid origin. Expected: {}, Got: {}",
                config.origin, self.origin
            )));
        }

        Ok(())
    }

    pub(super) fn hash(&self) -> digest::Digest {
        digest::digest(&digest::SHA256, &self.raw_data)
    }
}

/// Flags for AuthenticatorData as defined in WebAuthn Level 2
pub(super) mod auth_data_flags {
    /// User Present (UP) - Bit 0
    pub(crate) const UP: u8 = 1 << 0;
    /// User Verified (UV) - Bit 2
    pub(crate) const UV: u8 = 1 << 2;
    /// Backup Eligibility (BE) - Bit 3
    pub(crate) const BE: u8 = 1 << 3;
    /// Backup State (BS) - Bit 4
    pub(crate) const BS: u8 = 1 << 4;
    /// Attested Credential Data Present - Bit 6
    pub(crate) const AT: u8 = 1 << 6;
}

/// AuthenticatorData structure as defined in WebAuthn Level 2
/// https://www.w3.org/TR/webauthn-2/#sctn-authenticator-data
#[derive(Debug)]
pub(super) struct AuthenticatorData {
    /// SHA-256 hash of the RP ID (32 bytes)
    pub(super) rp_id_hash: Vec<u8>,
    pub(super) flags: u8,
    /// Signature counter, 32-bit unsigned big-endian
    pub(super) counter: u32,
    /// Raw authenticator data for signature verification
    pub(super) raw_data: Vec<u8>,
}

impl AuthenticatorData {
    /// Format (minimum 37 bytes):
    /// - RP ID Hash (32 bytes)
    /// - Flags (1 byte)
    /// - Counter (4 bytes)
    /// - Optional: Attested Credential Data
    /// - Optional: Extensions
    pub(super) fn from_bytes(data: Vec<u8>) -> Result<Self, PasskeyError> {
        if data.len() < 37 {
            return Err(PasskeyError::AuthenticatorData(
                "Authenticator data too short. For more details, run with RUST_LOG=debug".into(),
            ));
        }

        Ok(Self {
            rp_id_hash: data[..32].to_vec(),
            flags: data[32],
            counter: u32::from_be_bytes([data[33], data[34], data[35], data[36]]),
            raw_data: data,
        })
    }

    pub(super) fn from_base64(auth_data: &str) -> Result<Self, PasskeyError> {
        let data = base64url_decode(auth_data)
            .map_err(|e| PasskeyError::Format(format!("Failed to decode: {e}")))?;
        Self::from_bytes(data)
    }

    pub(super) fn is_user_present(&self) -> bool {
        (self.flags & auth_data_flags::UP) != 0
    }

    pub(super) fn is_user_verified(&self) -> bool {
        (self.flags & auth_data_flags::UV) != 0
    }

    pub(super) fn has_attested_credential_data(&self) -> bool {
        (self.flags & auth_data_flags::AT) != 0
    }

    /// Verifies rpIdHash, the UP flag, and UV when the relying party requires it.
    pub(super) fn verify(&self, config: &PasskeyConfig) -> Result<(), PasskeyError> {
        let expected_hash = digest::digest(&digest::SHA256, config.rp_id.as_bytes());
        if self.rp_id_hash != expected_hash.as_ref() {
            return Err(PasskeyError::AuthenticatorData(
                "Invalid RP ID hash. For more details, run with RUST_LOG=debug".into(),
            ));
        }

        if !self.is_user_present() {
            return Err(PasskeyError::AuthenticatorData(
                "User not present. For more details, run with RUST_LOG=debug".into(),
            ));
        }

        if config.user_verification_required() && !self.is_user_verified() {
            return Err(PasskeyError::AuthenticatorData(format!(
                "User verification required but flag not set. Flags: {:02x}",
                self.flags
            )));
        }

        tracing::debug!(
            "Authenticator data verified: UP={}, UV={}, BE={}, BS={}, AT={}",
            self.is_user_present(),
            self.is_user_verified(),
            (self.flags & auth_data_flags::BE) != 0,
            (self.flags & auth_data_flags::BS) != 0,
            self.has_attested_credential_data()
        );

        Ok(())
    }
}

/// The attested credential data block that follows the 37 fixed bytes.
#[derive(Debug)]
pub(super) struct AttestedCredential {
    pub(super) credential_id: Vec<u8>,
    /// The COSE_Key exactly as encoded by the authenticator.
    pub(super) cose_key: Vec<u8>,
}

impl AttestedCredential {
    /// Layout after byte 37: AAGUID (16) | credIdLen (2, BE) | credId | COSE_Key | extensions
    pub(super) fn parse(auth_data: &AuthenticatorData) -> Result<Self, PasskeyError> {
        if !auth_data.has_attested_credential_data() {
            return Err(PasskeyError::AuthenticatorData(
                "No attested credential data present".into(),
            ));
        }

        let data = &auth_data.raw_data;
        let mut pos = 37 + 16;

        if data.len() < pos + 2 {
            return Err(PasskeyError::Format(
                "Authenticator data too short".to_string(),
            ));
        }

        let cred_id_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;

        if cred_id_len == 0 || cred_id_len > 1023 {
            return Err(PasskeyError::Format(
                "Invalid credential ID length".to_string(),
            ));
        }

        if data.len() < pos + cred_id_len {
            return Err(PasskeyError::Format(
                "Authenticator data too short for credential ID".to_string(),
            ));
        }

        let credential_id = data[pos..pos + cred_id_len].to_vec();
        pos += cred_id_len;

        // Decode once to learn where the key ends; extensions may follow it.
        let mut cursor = std::io::Cursor::new(&data[pos..]);
        let _: CborValue = ciborium::de::from_reader(&mut cursor)
            .map_err(|e| PasskeyError::Format(format!("Invalid public key CBOR: {e}")))?;
        let key_len = cursor.position() as usize;

        Ok(Self {
            credential_id,
            cose_key: data[pos..pos + key_len].to_vec(),
        })
    }
}

pub(super) fn parse_attestation_object(
    attestation_base64: &str,
) -> Result<AttestationObject, PasskeyError> {
    let attestation_bytes = base64url_decode(attestation_base64)
        .map_err(|e| PasskeyError::Format(format!("Failed to decode attestation object: {e}")))?;

    let attestation_cbor: CborValue = ciborium::de::from_reader(&attestation_bytes[..])
        .map_err(|e| PasskeyError::Format(format!("Invalid CBOR data: {e}")))?;

    let CborValue::Map(map) = attestation_cbor else {
        return Err(PasskeyError::Format(
            "Invalid attestation format".to_string(),
        ));
    };

    let mut fmt = None;
    let mut auth_data = None;
    let mut att_stmt = None;

    for (key, value) in map {
        let CborValue::Text(k) = key else { continue };
        match (k.as_str(), value) {
            ("fmt", CborValue::Text(f)) => fmt = Some(f),
            ("authData", CborValue::Bytes(d)) => auth_data = Some(d),
            ("attStmt", CborValue::Map(s)) => att_stmt = Some(s),
            _ => {}
        }
    }

    match (fmt, auth_data, att_stmt) {
        (Some(fmt), Some(auth_data), Some(att_stmt)) => Ok(AttestationObject {
            fmt,
            auth_data,
            att_stmt,
        }),
        _ => Err(PasskeyError::Format(
            "Missing required attestation data".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64url_encode;
    use serde_json::json;

    fn config() -> PasskeyConfig {
        PasskeyConfig::new("https://example.com", "Example").unwrap()
    }

    fn auth_data_bytes(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
        let mut data = digest::digest(&digest::SHA256, rp_id.as_bytes())
            .as_ref()
            .to_vec();
        data.push(flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data
    }

    fn client_data(type_: &str, challenge: &str, origin: &str) -> String {
        base64url_encode(
            json!({"type": type_, "challenge": challenge, "origin": origin, "crossOrigin": false})
                .to_string()
                .as_bytes(),
        )
    }

    #[test]
    fn test_client_data_verify_ok() {
        let parsed =
            ParsedClientData::from_base64(&client_data("webauthn.get", "abc", "https://example.com"))
                .unwrap();

        assert!(parsed.verify("webauthn.get", "abc", &config()).is_ok());
    }

    #[test]
    fn test_client_data_verify_failures() {
        let config = config();

        // Wrong ceremony type
        let wrong_type =
            ParsedClientData::from_base64(&client_data("webauthn.create", "abc", "https://example.com"))
                .unwrap();
        assert!(matches!(
            wrong_type.verify("webauthn.get", "abc", &config),
            Err(PasskeyError::ClientData(_))
        ));

        // Wrong challenge
        let wrong_challenge =
            ParsedClientData::from_base64(&client_data("webauthn.get", "xyz", "https://example.com"))
                .unwrap();
        assert!(wrong_challenge.verify("webauthn.get", "abc", &config).is_err());

        // Wrong origin
        let wrong_origin =
            ParsedClientData::from_base64(&client_data("webauthn.get", "abc", "https://evil.example"))
                .unwrap();
        assert!(wrong_origin.verify("webauthn.get", "abc", &config).is_err());
    }

    #[test]
    fn test_client_data_missing_fields() {
        let encoded = base64url_encode(br#"{"type":"webauthn.get"}"#);
        assert!(matches!(
            ParsedClientData::from_base64(&encoded),
            Err(PasskeyError::ClientData(_))
        ));
    }

    #[test]
    fn test_authenticator_data_parse_counter() {
        let data = auth_data_bytes("example.com", auth_data_flags::UP, 0x0102_0304);

        let parsed = AuthenticatorData::from_bytes(data).unwrap();

        assert_eq!(parsed.counter, 0x0102_0304);
        assert!(parsed.is_user_present());
        assert!(!parsed.is_user_verified());
        assert!(parsed.verify(&config()).is_ok());
    }

    #[test]
    fn test_authenticator_data_too_short() {
        assert!(matches!(
            AuthenticatorData::from_bytes(vec![0; 36]),
            Err(PasskeyError::AuthenticatorData(_))
        ));
    }

    #[test]
    fn test_authenticator_data_verify_failures() {
        let config = config();

        let wrong_rp = AuthenticatorData::from_bytes(auth_data_bytes("other.com", 0x01, 1)).unwrap();
        assert!(wrong_rp.verify(&config).is_err());

        let not_present = AuthenticatorData::from_bytes(auth_data_bytes("example.com", 0x00, 1)).unwrap();
        assert!(not_present.verify(&config).is_err());

        let mut strict = config.clone();
        strict.user_verification = "required".to_string();
        let unverified = AuthenticatorData::from_bytes(auth_data_bytes("example.com", 0x01, 1)).unwrap();
        assert!(unverified.verify(&strict).is_err());
        let verified = AuthenticatorData::from_bytes(auth_data_bytes("example.com", 0x05, 1)).unwrap();
        assert!(verified.verify(&strict).is_ok());
    }

    #[test]
    fn test_attested_credential_parse_with_trailing_extensions() {
        // Given authData carrying a credential, a COSE key and an extensions map
        let mut data = auth_data_bytes("example.com", auth_data_flags::UP | auth_data_flags::AT, 0);
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(b"abc");
        let key = CborValue::Map(vec![(
            CborValue::Integer(1.into()),
            CborValue::Integer(2.into()),
        )]);
        let mut key_bytes = Vec::new();
        ciborium::ser::into_writer(&key, &mut key_bytes).unwrap();
        data.extend_from_slice(&key_bytes);
        let ext = CborValue::Map(vec![(
            CborValue::Text("credProtect".into()),
            CborValue::Integer(1.into()),
        )]);
        ciborium::ser::into_writer(&ext, &mut data).unwrap();

        // When parsing
        let parsed = AttestedCredential::parse(&AuthenticatorData::from_bytes(data).unwrap()).unwrap();

        // Then only the key bytes are captured
        assert_eq!(parsed.credential_id, b"abc");
        assert_eq!(parsed.cose_key, key_bytes);
    }

    #[test]
    fn test_attested_credential_requires_at_flag() {
        let data = auth_data_bytes("example.com", auth_data_flags::UP, 0);
        assert!(AttestedCredential::parse(&AuthenticatorData::from_bytes(data).unwrap()).is_err());
    }

    #[test]
    fn test_parse_attestation_object() {
        // Given a minimal "none" attestation object
        let obj = CborValue::Map(vec![
            (CborValue::Text("fmt".into()), CborValue::Text("none".into())),
            (CborValue::Text("attStmt".into()), CborValue::Map(vec![])),
            (CborValue::Text("authData".into()), CborValue::Bytes(vec![1, 2, 3])),
        ]);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&obj, &mut bytes).unwrap();

        // When parsing
        let parsed = parse_attestation_object(&base64url_encode(&bytes)).unwrap();

        // Then all three members are extracted
        assert_eq!(parsed.fmt, "none");
        assert_eq!(parsed.auth_data, vec![1, 2, 3]);
        assert!(parsed.att_stmt.is_empty());
    }

    #[test]
    fn test_parse_attestation_object_missing_member() {
        let obj = CborValue::Map(vec![(
            CborValue::Text("fmt".into()),
            CborValue::Text("none".into()),
        )]);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&obj, &mut bytes).unwrap();

        assert!(matches!(
            parse_attestation_object(&base64url_encode(&bytes)),
            Err(PasskeyError::Format(_))
        ));
    }
}
