use ciborium::value::Value as CborValue;
use ring::signature::{self, UnparsedPublicKey};
use x509_parser::prelude::*;

use super::stmt_get;
use crate::passkey::errors::PasskeyError;
use crate::passkey::main::cose::{CosePublicKey, ES256_ALG};

/// Packed attestation, either self-attested or with an `x5c` leaf certificate.
/// ECDAA is rejected.
pub(super) fn verify_packed_attestation(
    auth_data: &[u8],
    client_data_hash: &[u8],
    att_stmt: &[(CborValue, CborValue)],
    credential_key: &CosePublicKey,
) -> Result<(), PasskeyError> {
    let alg = match stmt_get(att_stmt, "alg") {
        Some(CborValue::Integer(i)) => i64::try_from(i128::from(*i))
            .map_err(|_| PasskeyError::Format("alg out of range".to_string()))?,
        _ => return Err(PasskeyError::Format("Missing alg in attStmt".to_string())),
    };
    let sig = match stmt_get(att_stmt, "sig") {
        Some(CborValue::Bytes(sig)) => sig,
        _ => return Err(PasskeyError::Format("Missing sig in attStmt".to_string())),
    };

    let mut signed_data = Vec::with_capacity(auth_data.len() + client_data_hash.len());
    signed_data.extend_from_slice(auth_data);
    signed_data.extend_from_slice(client_data_hash);

    if stmt_get(att_stmt, "ecdaaKeyId").is_some() {
        return Err(PasskeyError::Verification(
            "ECDAA attestation not supported".to_string(),
        ));
    }

    match stmt_get(att_stmt, "x5c") {
        Some(CborValue::Array(certs)) => {
            tracing::debug!("Full attestation with certificate chain");
            let Some(CborValue::Bytes(leaf)) = certs.first() else {
                return Err(PasskeyError::Format("Empty x5c in attStmt".to_string()));
            };
            if alg != ES256_ALG {
                return Err(PasskeyError::Verification(format!(
                    "Unsupported attestation algorithm: {alg}"
                )));
            }
            verify_with_certificate(leaf, &signed_data, sig)
        }
        Some(_) => Err(PasskeyError::Format("x5c must be an array".to_string())),
        None => {
            tracing::debug!("Self attestation");
            if alg != credential_key.alg() {
                return Err(PasskeyError::Verification(format!(
                    "Self attestation alg {alg} does not match credential key"
                )));
            }
            credential_key.verify(&signed_data, sig)
        }
    }
}

fn verify_with_certificate(
    cert_der: &[u8],
    signed_data: &[u8],
    sig: &[u8],
) -> Result<(), PasskeyError> {
    let (_, cert) = X509Certificate::from_der(cert_der).map_err(|e| {
        PasskeyError::Verification(format!("Failed to parse X509 certificate: {e}"))
    })?;

    if let Ok(Some(bc)) = cert.basic_constraints() {
        if bc.value.ca {
            return Err(PasskeyError::Verification(
                "Certificate must not be a CA certificate".to_string(),
            ));
        }
    }

    if !cert.validity().is_valid() {
        return Err(PasskeyError::Verification(
            "Attestation certificate is expired or not yet valid".to_string(),
        ));
    }

    let public_key = &cert.public_key().subject_public_key.data;
    UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_ASN1, public_key)
        .verify(signed_data, sig)
        .map_err(|_| PasskeyError::Verification("Attestation signature invalid".to_string()))
}
