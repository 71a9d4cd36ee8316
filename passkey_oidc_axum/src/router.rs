use axum::{Router, middleware};

use super::auth::auth_router;
use super::oidc::oidc_router;
use super::passkey::passkey_router;
use super::session::session_layer;
use super::state::AuthState;

/// All authentication routes behind the session middleware.
///
/// ```no_run
/// # async fn run(state: passkey_oidc_axum::AuthState) {
/// let app = passkey_oidc_axum::router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
/// axum::serve(listener, app).await.unwrap();
/// # }
/// ```
pub fn router(state: AuthState) -> Router {
    Router::new()
        .nest("/api/passkey", passkey_router())
        .nest("/auth", oidc_router())
        .nest("/api/auth", auth_router())
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .with_state(state)
}
