use hmac::{Hmac, Mac};
use http::header::{COOKIE, HeaderMap};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::session::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::utils::{base64url_decode, base64url_encode, header_set_cookie};

type HmacSha256 = Hmac<Sha256>;

/// Fresh opaque session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn mac_for(session_id: &str, secret: &[u8]) -> Result<HmacSha256, SessionError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SessionError::Crypto(format!("Invalid session secret: {e}")))?;
    mac.update(session_id.as_bytes());
    Ok(mac)
}

/// Cookie value for `session_id`: `"{id}.{base64url(hmac)}"`.
pub fn sign_session_id(session_id: &str, secret: &[u8]) -> Result<String, SessionError> {
    let tag = mac_for(session_id, secret)?.finalize().into_bytes();
    Ok(format!("{session_id}.{}", base64url_encode(&tag)))
}

/// Returns the session id if the cookie value carries a valid signature.
pub fn verify_signed_session_id(cookie_value: &str, secret: &[u8]) -> Option<String> {
    let (session_id, signature) = cookie_value.rsplit_once('.')?;
    if session_id.is_empty() {
        return None;
    }
    let provided = base64url_decode(signature).ok()?;
    let expected = mac_for(session_id, secret).ok()?.finalize().into_bytes();

    if expected.as_slice().ct_eq(&provided).into() {
        Some(session_id.to_string())
    } else {
        tracing::warn!("Session cookie signature mismatch");
        None
    }
}

/// Extracts and verifies the session id from the request's `Cookie` headers.
/// Missing, malformed and tampered cookies all read as `None`.
pub fn session_id_from_headers(headers: &HeaderMap, config: &SessionConfig) -> Option<String> {
    let cookie_name = config.cookie_name.as_str();

    let value = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|pair| match pair.split_once('=') {
            Some((k, v)) if k == cookie_name => Some(v),
            _ => None,
        });

    let Some(value) = value else {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
        return None;
    };

    verify_signed_session_id(value, &config.secret)
}

pub fn session_cookie_header(
    session_id: &str,
    config: &SessionConfig,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    let value = sign_session_id(session_id, &config.secret)?;
    header_set_cookie(&mut headers, &config.cookie_name, &value, config.ttl as i64)
        .map_err(|e| SessionError::Cookie(e.to_string()))?;
    Ok(headers)
}

/// `Set-Cookie` that makes the browser drop the session cookie.
pub fn expired_session_cookie_header(config: &SessionConfig) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, &config.cookie_name, "", 0)
        .map_err(|e| SessionError::Cookie(e.to_string()))?;
    Ok(headers)
}
