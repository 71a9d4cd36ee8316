use axum::Json;
use http::StatusCode;
use serde_json::{Value, json};

use passkey_oidc::{OidcError, PasskeyError, SessionError};

/// Status code plus a `{"error": message}` body.
pub type ErrorResponse = (StatusCode, Json<Value>);

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (status, Json(json!({ "error": message.into() })))
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse>;
}

/// Internal failures are logged and reported without detail.
fn internal(err: &dyn std::fmt::Display) -> ErrorResponse {
    tracing::error!("Internal error: {}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

impl<T> IntoResponseError<T> for Result<T, PasskeyError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            PasskeyError::Validation(_) | PasskeyError::AlreadyRegistered(_) => {
                error_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            PasskeyError::SessionStateMissing(_)
            | PasskeyError::UserNotFound(_)
            | PasskeyError::AuthenticatorNotRegistered => {
                error_response(StatusCode::NOT_FOUND, e.to_string())
            }
            PasskeyError::SignatureInvalid
            | PasskeyError::ClientData(_)
            | PasskeyError::AuthenticatorData(_)
            | PasskeyError::Verification(_)
            | PasskeyError::Counter(_)
            | PasskeyError::Format(_) => error_response(
                StatusCode::BAD_REQUEST,
                PasskeyError::SignatureInvalid.to_string(),
            ),
            PasskeyError::Storage(_) | PasskeyError::Utils(_) => internal(&e),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, OidcError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            OidcError::Provider(_) | OidcError::Http(_) => {
                tracing::error!("Identity provider failure: {}", e);
                error_response(StatusCode::BAD_GATEWAY, e.to_string())
            }
            OidcError::Storage(_) | OidcError::Utils(_) => internal(&e),
            _ => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| internal(&e))
    }
}

/// Message placed in the `error` query parameter of the callback redirect.
pub(crate) fn callback_error_message(err: &OidcError) -> String {
    match err {
        OidcError::Storage(_) | OidcError::Utils(_) => {
            tracing::error!("OIDC callback failed: {}", err);
            INTERNAL_ERROR_MESSAGE.to_string()
        }
        _ => {
            tracing::warn!("OIDC callback rejected: {}", err);
            err.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: PasskeyError) -> (StatusCode, Value) {
        let result: Result<(), PasskeyError> = Err(err);
        let (status, Json(body)) = result.into_response_error().unwrap_err();
        (status, body)
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        // Given an already registered user
        let (status, body) = status_of(PasskeyError::AlreadyRegistered("alice".to_string()));

        // Then the caller gets 400 with the reason
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "User is already registered: alice");

        let (status, _) = status_of(PasskeyError::Validation("userName is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_errors() {
        for err in [
            PasskeyError::SessionStateMissing("challenge"),
            PasskeyError::UserNotFound("bob".to_string()),
            PasskeyError::AuthenticatorNotRegistered,
        ] {
            let (status, _) = status_of(err);
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_verification_failures_stay_generic() {
        // Given a detailed counter failure
        let (status, body) = status_of(PasskeyError::Counter("5 <= 5".to_string()));

        // Then the detail does not reach the client
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Can not validate response signature");
    }

    #[test]
    fn test_storage_error_is_internal_and_redacted() {
        let (status, body) = status_of(PasskeyError::Storage("redis://secret-host".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_oidc_error_mapping() {
        let result: Result<(), OidcError> = Err(OidcError::Provider("down".to_string()));
        let (status, _) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let result: Result<(), OidcError> = Err(OidcError::StateMismatch);
        let (status, _) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_callback_error_message() {
        assert_eq!(
            callback_error_message(&OidcError::StateMismatch),
            "State mismatch"
        );
        assert_eq!(
            callback_error_message(&OidcError::Storage("conn refused".into())),
            "Internal server error"
        );
    }

    #[test]
    fn test_ok_passes_through() {
        let result: Result<u32, SessionError> = Ok(7);
        assert_eq!(result.into_response_error().unwrap(), 7);
    }
}
