use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::{TypedHeader, headers};
use serde::Deserialize;
use serde_json::{Value, json};

use passkey_oidc::{
    AuthenticationOptions, AuthenticationResponse, RegistrationOptions, RegistrationResponse,
};

use super::error::{ErrorResponse, IntoResponseError};
use super::session::AuthSession;
use super::state::AuthState;

/// Passkey ceremony endpoints, mounted at `/api/passkey` by [`router`](crate::router).
pub fn passkey_router() -> Router<AuthState> {
    Router::new()
        .route(
            "/generate-registration-options",
            post(generate_registration_options),
        )
        .route("/verify-registration", post(verify_registration))
        .route(
            "/generate-authentication-options",
            post(generate_authentication_options),
        )
        .route("/verify-authentication", post(verify_authentication))
        .route("/unregister", post(unregister))
        .route("/authenticators", get(list_authenticators))
}

/// `{userName}` body or query. A missing name deserializes to `""` and is
/// rejected by the engine.
#[derive(Debug, Deserialize)]
struct UserNameRequest {
    #[serde(rename = "userName", default)]
    user_name: String,
}

async fn generate_registration_options(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
    Json(request): Json<UserNameRequest>,
) -> Result<Json<RegistrationOptions>, ErrorResponse> {
    state
        .passkey
        .generate_registration_options(&mut session, &request.user_name)
        .await
        .map(Json)
        .into_response_error()
}

async fn verify_registration(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    Json(response): Json<RegistrationResponse>,
) -> Result<Json<Value>, ErrorResponse> {
    let user_agent = user_agent.as_ref().map(|TypedHeader(ua)| ua.as_str());
    state
        .passkey
        .verify_registration(&mut session, &response, user_agent)
        .await
        .into_response_error()?;
    Ok(Json(json!({ "verified": true })))
}

async fn generate_authentication_options(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
    Json(request): Json<UserNameRequest>,
) -> Result<Json<AuthenticationOptions>, ErrorResponse> {
    state
        .passkey
        .generate_authentication_options(&mut session, &request.user_name)
        .await
        .map(Json)
        .into_response_error()
}

async fn verify_authentication(
    State(state): State<AuthState>,
    AuthSession(mut session): AuthSession,
    Json(response): Json<AuthenticationResponse>,
) -> Result<Json<Value>, ErrorResponse> {
    state
        .passkey
        .verify_authentication(&mut session, &response)
        .await
        .into_response_error()?;
    Ok(Json(json!({ "verified": true })))
}

async fn unregister(
    State(state): State<AuthState>,
    Json(request): Json<UserNameRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    state
        .passkey
        .unregister(&request.user_name)
        .await
        .into_response_error()?;
    Ok(Json(json!({ "success": true })))
}

async fn list_authenticators(
    State(state): State<AuthState>,
    Query(request): Query<UserNameRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let authenticators = state
        .passkey
        .list_authenticators(&request.user_name)
        .await
        .into_response_error()?;
    Ok(Json(json!({ "authenticators": authenticators })))
}
