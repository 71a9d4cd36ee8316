use serde::{Deserialize, Serialize};

/// A registered (or provisionally created) identity.
///
/// Serialized as camelCase JSON under `v1:user:{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Random, URL-safe, never reassigned.
    pub id: String,
    /// Login identifier; unique and case-sensitive. The email address for OIDC users.
    pub name: String,
    pub authenticators: Vec<Authenticator>,
    /// Set once a passkey registration ceremony has completed.
    pub registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_account: Option<OidcAccount>,
}

impl User {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            authenticators: Vec::new(),
            registered: false,
            oidc_account: None,
        }
    }
}

/// One passkey credential. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Authenticator {
    /// base64url credential id
    pub id: String,
    /// base64url COSE_Key bytes
    pub public_key: String,
    pub counter: u32,
    pub os_name: String,
    pub os_version: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub transports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OidcAccount {
    pub iss: String,
    pub sub: String,
    pub created_at: i64,
    pub updated_at: i64,
}
