use serde::Deserialize;

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct OidcTokenResponse {
    #[allow(dead_code)]
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) id_token: Option<String>,
}

/// OAuth2 error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuth2ErrorResponse {
    pub(crate) error: String,
    pub(crate) error_description: Option<String>,
}

/// Claims this flow reads from a verified ID token.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdTokenClaims {
    pub(crate) iss: String,
    pub(crate) sub: String,
    pub(crate) email: Option<String>,
    pub(crate) nonce: Option<String>,
}
