use crate::oidc::config::OidcConfig;
use crate::oidc::errors::OidcError;
use crate::oidc::types::{OAuth2ErrorResponse, OidcTokenResponse};

/// Redeems `code` at the token endpoint (client_secret_post) and returns the ID token.
pub(super) async fn exchange_code_for_token(
    client: &reqwest::Client,
    config: &OidcConfig,
    token_endpoint: &str,
    code: &str,
    code_verifier: &str,
) -> Result<String, OidcError> {
    let response = client
        .post(token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!("Token exchange failed with status: {}", status);
        return Err(match serde_json::from_str::<OAuth2ErrorResponse>(&body) {
            Ok(err) => OidcError::Provider(format!(
                "[{}] {}",
                err.error,
                err.error_description.unwrap_or_default()
            )),
            Err(_) => OidcError::Provider(format!("Token endpoint returned {status}")),
        });
    }

    parse_token_response(&body)
}

fn parse_token_response(body: &str) -> Result<String, OidcError> {
    let response: OidcTokenResponse = serde_json::from_str(body)
        .map_err(|e| OidcError::Provider(format!("Malformed token response: {e}")))?;

    if !response.token_type.eq_ignore_ascii_case("bearer") {
        return Err(OidcError::Provider(format!(
            "Unexpected token_type: {}",
            response.token_type
        )));
    }

    response
        .id_token
        .ok_or_else(|| OidcError::Provider("ID token not present in response".to_string()))
}
