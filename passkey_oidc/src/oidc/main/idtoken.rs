use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::oidc::errors::OidcError;
use crate::oidc::types::IdTokenClaims;

#[derive(Debug, Deserialize, Clone)]
pub(super) struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct Jwk {
    kty: String,
    kid: Option<String>,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
    crv: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

/// Clock skew tolerated on `exp`, `nbf` and `iat`, in seconds.
const LEEWAY_SECS: u64 = 2;

/// Fetched on every verification.
async fn fetch_jwks(client: &reqwest::Client, jwks_uri: &str) -> Result<Jwks, OidcError> {
    let response = client.get(jwks_uri).send().await?;
    if !response.status().is_success() {
        return Err(OidcError::Provider(format!(
            "JWKS request failed with status {}",
            response.status()
        )));
    }
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| OidcError::Provider(format!("Malformed JWKS: {e}")))
}

fn find_jwk<'a>(jwks: &'a Jwks, kid: &str) -> Option<&'a Jwk> {
    jwks.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
}

fn component<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, OidcError> {
    value
        .as_deref()
        .ok_or_else(|| OidcError::Provider(format!("JWK is missing {name}")))
}

/// Only RS256 and ES256 (P-256) keys are accepted.
fn convert_jwk_to_decoding_key(jwk: &Jwk) -> Result<(Algorithm, DecodingKey), OidcError> {
    let invalid = |e: jsonwebtoken::errors::Error| OidcError::Provider(format!("Invalid JWK: {e}"));

    match (jwk.kty.as_str(), jwk.alg.as_deref()) {
        ("RSA", None | Some("RS256")) => {
            let key = DecodingKey::from_rsa_components(component(&jwk.n, "n")?, component(&jwk.e, "e")?)
                .map_err(invalid)?;
            Ok((Algorithm::RS256, key))
        }
        ("EC", None | Some("ES256")) => {
            if jwk.crv.as_deref() != Some("P-256") {
                return Err(OidcError::Provider(format!(
                    "Unsupported curve: {:?}",
                    jwk.crv
                )));
            }
            let key = DecodingKey::from_ec_components(component(&jwk.x, "x")?, component(&jwk.y, "y")?)
                .map_err(invalid)?;
            Ok((Algorithm::ES256, key))
        }
        (kty, alg) => Err(OidcError::Provider(format!(
            "Unsupported key type {kty} with algorithm {alg:?}"
        ))),
    }
}

/// Checks the signature against the provider's published key and validates
/// `iss`, `aud` and `exp`. The nonce is left to the caller.
pub(super) async fn verify_idtoken(
    client: &reqwest::Client,
    token: &str,
    jwks_uri: &str,
    issuer: &str,
    audience: &str,
) -> Result<IdTokenClaims, OidcError> {
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| OidcError::Signature(format!("Malformed token header: {e}")))?;
    let kid = header
        .kid
        .ok_or_else(|| OidcError::Signature("ID token doesn't have kid parameter".to_string()))?;

    tracing::debug!("Algorithm from JWT header: {:?}", header.alg);

    let jwks = fetch_jwks(client, jwks_uri).await?;
    let jwk = find_jwk(&jwks, &kid).ok_or_else(|| OidcError::KeyNotFound(kid.clone()))?;
    let (alg, decoding_key) = convert_jwk_to_decoding_key(jwk)?;

    if header.alg != alg {
        return Err(OidcError::Signature(format!(
            "Token alg {:?} does not match key alg {:?}",
            header.alg, alg
        )));
    }

    decode_claims(token, &decoding_key, alg, issuer, audience)
}

fn decode_claims(
    token: &str,
    key: &DecodingKey,
    alg: Algorithm,
    issuer: &str,
    audience: &str,
) -> Result<IdTokenClaims, OidcError> {
    let mut validation = Validation::new(alg);
    validation.set_audience(&[audience]);
    // Accept the issuer with or without a trailing slash.
    let issuer = issuer.trim_end_matches('/');
    validation.set_issuer(&[issuer.to_string(), format!("{issuer}/")]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    validation.leeway = LEEWAY_SECS;

    let data = jsonwebtoken::decode::<IdTokenClaims>(token, key, &validation).map_err(|e| {
        tracing::warn!("ID token rejected: {}", e);
        OidcError::Signature(e.to_string())
    })?;

    tracing::debug!("ID token verified for sub {}", data.claims.sub);
    Ok(data.claims)
}
