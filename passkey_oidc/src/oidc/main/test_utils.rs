//! An ES256 token signer and a throwaway identity provider for flow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair};
use serde_json::{Value, json};

use crate::utils::base64url_encode;

pub(crate) struct TestSigner {
    kid: String,
    pkcs8: Vec<u8>,
    x: String,
    y: String,
}

impl TestSigner {
    pub(crate) fn generate(kid: &str) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng).unwrap();
        let pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        let point = pair.public_key().as_ref();
        Self {
            kid: kid.to_string(),
            pkcs8: pkcs8.as_ref().to_vec(),
            x: base64url_encode(&point[1..33]),
            y: base64url_encode(&point[33..65]),
        }
    }

    pub(crate) fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.kid.clone());
        jsonwebtoken::encode(&header, claims, &EncodingKey::from_ec_der(&self.pkcs8)).unwrap()
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_ec_components(&self.x, &self.y).unwrap()
    }

    pub(crate) fn jwks(&self) -> Value {
        json!({
            "keys": [{
                "kty": "EC",
                "crv": "P-256",
                "alg": "ES256",
                "use": "sig",
                "kid": self.kid,
                "x": self.x,
                "y": self.y
            }]
        })
    }
}

#[derive(Clone, Default)]
struct ProviderState {
    issuer: String,
    jwks: Value,
    id_token: Arc<Mutex<Option<String>>>,
    token_requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Serves discovery, token and JWKS endpoints on `127.0.0.1`.
pub(crate) struct MockProvider {
    pub(crate) issuer: String,
    pub(crate) signer: TestSigner,
    state: ProviderState,
}

impl MockProvider {
    pub(crate) async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let issuer = format!("http://{}", listener.local_addr().unwrap());
        let signer = TestSigner::generate("mock-key");

        let state = ProviderState {
            issuer: issuer.clone(),
            jwks: signer.jwks(),
            ..Default::default()
        };

        let app = Router::new()
            .route("/.well-known/openid-configuration", get(discovery))
            .route("/token", post(token))
            .route("/jwks", get(jwks))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            issuer,
            signer,
            state,
        }
    }

    /// Sets the ID token the token endpoint hands out next.
    pub(crate) fn issue(&self, claims: &Value) {
        self.issue_token(self.signer.sign(claims));
    }

    pub(crate) fn issue_token(&self, token: String) {
        *self.state.id_token.lock().unwrap() = Some(token);
    }

    pub(crate) fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.token_requests.lock().unwrap().clone()
    }
}

async fn discovery(State(state): State<ProviderState>) -> Json<Value> {
    Json(json!({
        "issuer": state.issuer,
        "authorization_endpoint": format!("{}/authorize", state.issuer),
        "token_endpoint": format!("{}/token", state.issuer),
        "jwks_uri": format!("{}/jwks", state.issuer),
        "code_challenge_methods_supported": ["S256"]
    }))
}

async fn token(
    State(state): State<ProviderState>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    state.token_requests.lock().unwrap().push(form);
    let id_token = state.id_token.lock().unwrap().clone();
    Json(json!({
        "access_token": "mock-access-token",
        "token_type": "Bearer",
        "expires_in": 3600,
        "id_token": id_token
    }))
}

async fn jwks(State(state): State<ProviderState>) -> Json<Value> {
    Json(state.jwks)
}
