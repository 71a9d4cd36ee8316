#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use ciborium::value::Value as CborValue;
use http::{Request, Response, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use ring::digest;
use ring::rand::SystemRandom;
use ring::signature::{
    ECDSA_P256_SHA256_ASN1_SIGNING, ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use passkey_oidc_axum::AuthState;

use passkey_oidc::storage::InMemoryKvStore;
use passkey_oidc::{
    KvStore, OidcConfig, OidcEngine, PasskeyConfig, PasskeyEngine, SessionConfig,
    UserRepository, base64url_encode,
};

pub const ORIGIN: &str = "http://localhost:3000";
pub const CLIENT_ID: &str = "test-client";

pub struct TestApp {
    pub router: Router,
    pub users: UserRepository,
    pub session_store: Arc<dyn KvStore>,
    pub passkey_config: PasskeyConfig,
}

pub fn passkey_config() -> PasskeyConfig {
    PasskeyConfig::new(ORIGIN, "Test RP").unwrap()
}

/// Router over in-memory stores. `issuer` enables the OIDC routes.
pub fn test_app(issuer: Option<&str>) -> TestApp {
    let session_store: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
    let users = UserRepository::new(Arc::new(InMemoryKvStore::new()), None);
    let passkey_config = passkey_config();

    let oidc = issuer.map(|issuer| {
        OidcEngine::new(
            OidcConfig {
                issuer: issuer.to_string(),
                client_id: CLIENT_ID.to_string(),
                client_secret: "test-secret".to_string(),
                redirect_uri: format!("{ORIGIN}/auth/callback"),
            },
            reqwest::Client::new(),
            users.clone(),
        )
    });

    let state = AuthState::new(
        PasskeyEngine::new(passkey_config.clone(), users.clone()),
        oidc,
        session_store.clone(),
        SessionConfig::new("test-session-secret"),
    );

    TestApp {
        router: passkey_oidc_axum::router(state),
        users,
        session_store,
        passkey_config,
    }
}

/// A request/response cycle that carries the session cookie forward.
pub struct Client {
    router: Router,
    pub cookie: Option<String>,
}

impl Client {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            cookie: None,
        }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> (u16, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::USER_AGENT,
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
            )
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.send(request).await;
        let status = response.status().as_u16();
        (status, body_json(response).await)
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A platform authenticator holding one P-256 credential.
pub struct SoftAuthenticator {
    pair: EcdsaKeyPair,
    rng: SystemRandom,
    pub credential_id: Vec<u8>,
}

impl SoftAuthenticator {
    pub fn new(credential_id: &[u8]) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        Self {
            pair,
            rng,
            credential_id: credential_id.to_vec(),
        }
    }

    fn cose_key(&self) -> Vec<u8> {
        let point = self.pair.public_key().as_ref();
        let key = CborValue::Map(vec![
            (CborValue::Integer(1.into()), CborValue::Integer(2.into())),
            (CborValue::Integer(3.into()), CborValue::Integer((-7).into())),
            (CborValue::Integer((-1).into()), CborValue::Integer(1.into())),
            (CborValue::Integer((-2).into()), CborValue::Bytes(point[1..33].to_vec())),
            (CborValue::Integer((-3).into()), CborValue::Bytes(point[33..65].to_vec())),
        ]);
        let mut out = Vec::new();
        ciborium::ser::into_writer(&key, &mut out).unwrap();
        out
    }

    fn client_data(type_: &str, challenge: &str) -> Vec<u8> {
        json!({"type": type_, "challenge": challenge, "origin": ORIGIN})
            .to_string()
            .into_bytes()
    }

    fn auth_data(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
        let mut data = digest::digest(&digest::SHA256, rp_id.as_bytes())
            .as_ref()
            .to_vec();
        data.push(flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data
    }

    /// Browser-shaped `none` attestation for `challenge`.
    pub fn register(&self, rp_id: &str, challenge: &str) -> Value {
        let client_data = Self::client_data("webauthn.create", challenge);
        // UP | UV | AT
        let mut auth_data = Self::auth_data(rp_id, 0x01 | 0x04 | 0x40, 0);
        auth_data.extend_from_slice(&[0u8; 16]);
        auth_data.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&self.credential_id);
        auth_data.extend_from_slice(&self.cose_key());

        let object = CborValue::Map(vec![
            (CborValue::Text("fmt".into()), CborValue::Text("none".into())),
            (CborValue::Text("attStmt".into()), CborValue::Map(vec![])),
            (CborValue::Text("authData".into()), CborValue::Bytes(auth_data)),
        ]);
        let mut object_bytes = Vec::new();
        ciborium::ser::into_writer(&object, &mut object_bytes).unwrap();

        let id = base64url_encode(&self.credential_id);
        json!({
            "id": id,
            "rawId": id,
            "type": "public-key",
            "authenticatorAttachment": "platform",
            "response": {
                "clientDataJSON": base64url_encode(&client_data),
                "attestationObject": base64url_encode(&object_bytes),
                "transports": ["internal", "hybrid"]
            }
        })
    }

    pub fn authenticate(&self, rp_id: &str, challenge: &str, counter: u32) -> Value {
        let client_data = Self::client_data("webauthn.get", challenge);
        let auth_data = Self::auth_data(rp_id, 0x01 | 0x04, counter);

        let mut signed = auth_data.clone();
        signed.extend_from_slice(digest::digest(&digest::SHA256, &client_data).as_ref());
        let signature = self.pair.sign(&self.rng, &signed).unwrap();

        let id = base64url_encode(&self.credential_id);
        json!({
            "id": id,
            "rawId": id,
            "type": "public-key",
            "response": {
                "clientDataJSON": base64url_encode(&client_data),
                "authenticatorData": base64url_encode(&auth_data),
                "signature": base64url_encode(signature.as_ref()),
                "userHandle": null
            }
        })
    }
}

#[derive(Clone)]
struct ProviderState {
    issuer: String,
    jwks: Value,
    id_token: Arc<Mutex<Option<String>>>,
}

/// Discovery, token and JWKS endpoints on an ephemeral local port. The token
/// endpoint returns whatever ID token was last passed to [`MockProvider::issue`].
pub struct MockProvider {
    pub issuer: String,
    pkcs8: Vec<u8>,
    state: ProviderState,
}

impl MockProvider {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let issuer = format!("http://{}", listener.local_addr().unwrap());

        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng).unwrap();
        let pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        let point = pair.public_key().as_ref();
        let jwks = json!({
            "keys": [{
                "kty": "EC",
                "crv": "P-256",
                "alg": "ES256",
                "kid": "provider-key",
                "x": base64url_encode(&point[1..33]),
                "y": base64url_encode(&point[33..65])
            }]
        });

        let state = ProviderState {
            issuer: issuer.clone(),
            jwks,
            id_token: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/.well-known/openid-configuration", get(discovery))
            .route("/token", post(token))
            .route("/jwks", get(jwks_handler))
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            issuer,
            pkcs8: pkcs8.as_ref().to_vec(),
            state,
        }
    }

    pub fn issue(&self, claims: &Value) {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some("provider-key".to_string());
        let token =
            jsonwebtoken::encode(&header, claims, &EncodingKey::from_ec_der(&self.pkcs8)).unwrap();
        *self.state.id_token.lock().unwrap() = Some(token);
    }
}

async fn discovery(State(state): State<ProviderState>) -> Json<Value> {
    Json(json!({
        "issuer": state.issuer,
        "authorization_endpoint": format!("{}/authorize", state.issuer),
        "token_endpoint": format!("{}/token", state.issuer),
        "jwks_uri": format!("{}/jwks", state.issuer)
    }))
}

async fn token(State(state): State<ProviderState>) -> Json<Value> {
    let id_token = state.id_token.lock().unwrap().clone();
    Json(json!({
        "access_token": "mock-access-token",
        "token_type": "Bearer",
        "expires_in": 3600,
        "id_token": id_token
    }))
}

async fn jwks_handler(State(state): State<ProviderState>) -> Json<Value> {
    Json(state.jwks)
}

/// Reads one query parameter from an absolute or relative URL.
pub fn query_param(location: &str, name: &str) -> Option<String> {
    let url = url_with_base(location);
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

fn url_with_base(location: &str) -> reqwest::Url {
    reqwest::Url::parse(location)
        .or_else(|_| reqwest::Url::parse(ORIGIN).and_then(|base| base.join(location)))
        .unwrap()
}
