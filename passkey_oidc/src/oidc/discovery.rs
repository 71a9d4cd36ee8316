use serde::{Deserialize, Serialize};

use super::errors::OidcError;

/// OIDC Discovery Document as defined by OpenID Connect Discovery 1.0
/// https://openid.net/specs/openid-connect-discovery-1_0.html
///
/// Only the members the flow relies on are required; a document without them
/// fails to deserialize and is rejected.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OidcDiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    pub userinfo_endpoint: Option<String>,
    pub scopes_supported: Option<Vec<String>>,
    pub response_types_supported: Option<Vec<String>>,
    pub code_challenge_methods_supported: Option<Vec<String>>,
    pub id_token_signing_alg_values_supported: Option<Vec<String>>,
}

/// Fetch OIDC discovery document from the well-known endpoint
///
/// The discovered `issuer` must equal `issuer_url`, ignoring a trailing slash.
pub(crate) async fn fetch_oidc_discovery(
    client: &reqwest::Client,
    issuer_url: &str,
) -> Result<OidcDiscoveryDocument, OidcError> {
    let issuer_url = issuer_url.trim_end_matches('/');
    let discovery_url = format!("{issuer_url}/.well-known/openid-configuration");

    tracing::debug!("Fetching OIDC discovery from: {}", discovery_url);

    let response = client.get(&discovery_url).send().await?;

    if !response.status().is_success() {
        tracing::error!("OIDC discovery failed with status: {}", response.status());
        return Err(OidcError::Provider(format!(
            "Discovery request failed with status {}",
            response.status()
        )));
    }

    let body = response.text().await?;
    let document = parse_discovery(&body, issuer_url)?;

    tracing::debug!(
        "Authorization endpoint: {}",
        document.authorization_endpoint
    );
    tracing::debug!("Token endpoint: {}", document.token_endpoint);
    tracing::debug!("JWKS URI: {}", document.jwks_uri);

    Ok(document)
}

fn parse_discovery(body: &str, issuer_url: &str) -> Result<OidcDiscoveryDocument, OidcError> {
    let document: OidcDiscoveryDocument = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Malformed discovery document: {}", e);
        OidcError::Provider(format!("Malformed discovery document: {e}"))
    })?;

    if document.issuer.trim_end_matches('/') != issuer_url.trim_end_matches('/') {
        tracing::error!(
            "Issuer mismatch in discovery document. Expected: {}, Found: {}",
            issuer_url,
            document.issuer
        );
        return Err(OidcError::Provider(format!(
            "Issuer mismatch: discovered={}, expected={}",
            document.issuer, issuer_url
        )));
    }

    Ok(document)
}
