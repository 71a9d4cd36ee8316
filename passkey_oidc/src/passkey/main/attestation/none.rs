use ciborium::value::Value as CborValue;

use crate::passkey::errors::PasskeyError;

/// `none` carries no statement; anything in it is a malformed response.
pub(super) fn verify_none_attestation(
    att_stmt: &[(CborValue, CborValue)],
) -> Result<(), PasskeyError> {
    if !att_stmt.is_empty() {
        return Err(PasskeyError::Verification(
            "attStmt must be empty for none attestation".to_string(),
        ));
    }
    Ok(())
}
