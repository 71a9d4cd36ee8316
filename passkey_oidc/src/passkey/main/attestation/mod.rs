mod none;
mod packed;

use ciborium::value::Value as CborValue;

use super::cose::CosePublicKey;
use super::types::AttestationObject;
use crate::passkey::errors::PasskeyError;

/// Dispatches on `fmt`. Only `none` and `packed` are accepted.
pub(super) fn verify_attestation(
    attestation: &AttestationObject,
    client_data_hash: &[u8],
    credential_key: &CosePublicKey,
) -> Result<(), PasskeyError> {
    match attestation.fmt.as_str() {
        "none" => {
            tracing::debug!("Using 'none' attestation format");
            none::verify_none_attestation(&attestation.att_stmt)
        }
        "packed" => {
            tracing::debug!("Using 'packed' attestation format");
            packed::verify_packed_attestation(
                &attestation.auth_data,
                client_data_hash,
                &attestation.att_stmt,
                credential_key,
            )
        }
        other => Err(PasskeyError::Format(format!(
            "Unsupported attestation format: {other}"
        ))),
    }
}

fn stmt_get<'a>(att_stmt: &'a [(CborValue, CborValue)], name: &str) -> Option<&'a CborValue> {
    att_stmt
        .iter()
        .find(|(k, _)| matches!(k, CborValue::Text(t) if t == name))
        .map(|(_, v)| v)
}
