use axum::{Json, Router, extract::State, routing::post};
use http::HeaderMap;
use serde_json::{Value, json};

use passkey_oidc::expired_session_cookie_header;

use super::error::{ErrorResponse, IntoResponseError};
use super::session::AuthSession;
use super::state::AuthState;

/// Session endpoints, mounted at `/api/auth` by [`router`](crate::router).
pub fn auth_router() -> Router<AuthState> {
    Router::new().route("/logout", post(logout))
}

/// Deletes the session record and expires the cookie.
async fn logout(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
) -> Result<(HeaderMap, Json<Value>), ErrorResponse> {
    session.clear().await.into_response_error()?;
    let headers = expired_session_cookie_header(&state.session_config).into_response_error()?;
    tracing::debug!("Logged out");
    Ok((headers, Json(json!({ "success": true }))))
}
