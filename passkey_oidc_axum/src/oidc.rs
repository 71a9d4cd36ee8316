use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use http::{StatusCode, header::LOCATION};

use passkey_oidc::{CallbackParams, OidcEngine, OidcError};

use super::error::{ErrorResponse, IntoResponseError, callback_error_message, error_response};
use super::session::AuthSession;
use super::state::AuthState;

/// OIDC endpoints, mounted at `/auth` by [`router`](crate::router).
///
/// `/google/options` is kept as an alias of `/options`.
pub fn oidc_router() -> Router<AuthState> {
    Router::new()
        .route("/options", get(authorization_url))
        .route("/google/options", get(authorization_url))
        .route("/callback", get(callback))
}

fn oidc_engine(state: &AuthState) -> Result<&OidcEngine, OidcError> {
    state
        .oidc
        .as_ref()
        .ok_or_else(|| OidcError::Provider("OIDC login is not configured".to_string()))
}

/// Returns the provider URL as plain text; the browser navigates there itself.
async fn authorization_url(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
) -> Result<String, ErrorResponse> {
    let engine = oidc_engine(&state)
        .map_err(|e| error_response(StatusCode::NOT_FOUND, e.to_string()))?;
    engine
        .authorization_url(&mut session)
        .await
        .into_response_error()
}

/// Always redirects to `/`, with `userName` on success and `error` otherwise.
async fn callback(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
    Query(params): Query<CallbackParams>,
) -> Response {
    let result = match oidc_engine(&state) {
        Ok(engine) => engine.handle_callback(&mut session, params).await,
        Err(e) => Err(e),
    };

    let location = match result {
        Ok(user_name) => {
            tracing::info!("OIDC login succeeded for {}", user_name);
            format!("/?userName={}", urlencoding::encode(&user_name))
        }
        Err(e) => format!(
            "/?error={}",
            urlencoding::encode(&callback_error_message(&e))
        ),
    };
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}
