use std::collections::HashMap;
use std::time::Duration;

use axum::{Router, extract::Query, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passkey_oidc::AuthConfig;
use passkey_oidc_axum::AuthState;

/// Landing page for the callback redirect.
async fn index(Query(params): Query<HashMap<String, String>>) -> String {
    match (params.get("userName"), params.get("error")) {
        (Some(user_name), _) => format!("Signed in as {user_name}"),
        (None, Some(error)) => format!("Sign-in failed: {error}"),
        (None, None) => "Hello, anonymous user".to_string(),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_oidc=debug,passkey_oidc_axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AuthConfig::from_env()?;
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(15))
        .build()?;
    let state = AuthState::from_config(&config, client).await?;

    let app = Router::new()
        .route("/", get(index))
        .merge(passkey_oidc_axum::router(state));

    let port: u16 = match std::env::var("SERVER_PORT") {
        Ok(port) if !port.is_empty() => port.parse()?,
        _ => 3000,
    };
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
