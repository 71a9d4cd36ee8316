use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single session value. Sessions only hold strings, numbers and booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

pub type SessionData = HashMap<String, SessionValue>;

impl SessionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl From<String> for SessionValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for SessionValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for SessionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SessionValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}
