use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use http::{StatusCode, header::SET_COOKIE, request::Parts};

use passkey_oidc::{Session, new_session_id, session_cookie_header, session_id_from_headers};

use super::error::{ErrorResponse, IntoResponseError, error_response};
use super::state::AuthState;

/// Session id resolved by [`session_layer`] for the current request.
#[derive(Clone, Debug)]
struct SessionId(String);

/// Resolves the signed session cookie, or mints a new id when it is missing or
/// tampered with. A `Set-Cookie` header is added only for a newly minted id,
/// unless the handler already set one itself (logout does).
pub async fn session_layer(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let (session_id, minted) = match session_id_from_headers(req.headers(), &state.session_config)
    {
        Some(id) => (id, false),
        None => (new_session_id(), true),
    };
    req.extensions_mut().insert(SessionId(session_id.clone()));

    let mut response = next.run(req).await;

    if minted && !response.headers().contains_key(SET_COOKIE) {
        match session_cookie_header(&session_id, &state.session_config) {
            Ok(headers) => response.headers_mut().extend(headers),
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }
    response
}

/// The request's session, read from storage once.
///
/// Requires [`session_layer`] to be installed on the router.
pub struct AuthSession(pub Session);

impl FromRequestParts<AuthState> for AuthSession {
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState,
    ) -> Result<Self, Self::Rejection> {
        let SessionId(id) = parts.extensions.get::<SessionId>().cloned().ok_or_else(|| {
            tracing::error!("Session middleware is not installed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

        Session::new(
            state.session_store.clone(),
            id,
            state.session_config.ttl,
        )
        .load()
        .await
        .map(AuthSession)
        .into_response_error()
    }
}
