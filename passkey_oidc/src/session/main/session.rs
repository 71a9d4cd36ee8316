use std::collections::HashMap;
use std::sync::Arc;

use crate::session::errors::SessionError;
use crate::session::types::{SessionData, SessionValue};
use crate::storage::KvStore;

/// Marker for the two phases of a session handle.
pub trait SessionState: private::Sealed {}

/// The record has not been read from storage yet.
#[derive(Debug)]
pub struct Unloaded;

/// The record was read once and is held in memory for the rest of the request.
#[derive(Debug)]
pub struct Loaded {
    data: SessionData,
}

impl SessionState for Unloaded {}
impl SessionState for Loaded {}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Unloaded {}
    impl Sealed for super::Loaded {}
}

/// Per-browser session bound to one record in the session store.
///
/// A handle starts as `Session<Unloaded>` and becomes `Session<Loaded>` through
/// [`Session::load`], which reads storage exactly once. All accessors live on the
/// loaded state, so a second fetch within the same request cannot happen.
///
/// Every mutation writes the whole map back before returning and refreshes the
/// TTL. Reads never touch the TTL. There is no locking: two requests carrying
/// the same cookie race and the last write wins.
pub struct Session<S: SessionState = Loaded> {
    store: Arc<dyn KvStore>,
    id: String,
    ttl: u64,
    state: S,
}

impl<S: SessionState> Session<S> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }
}

impl Session<Unloaded> {
    pub fn new(store: Arc<dyn KvStore>, id: impl Into<String>, ttl: u64) -> Self {
        Self {
            store,
            id: id.into(),
            ttl,
            state: Unloaded,
        }
    }

    pub async fn load(self) -> Result<Session<Loaded>, SessionError> {
        let data = match self.store.get(&self.id).await? {
            Some(raw) => serde_json::from_str::<SessionData>(&raw)?,
            None => SessionData::new(),
        };
        tracing::debug!("Loaded session with {} keys", data.len());

        Ok(Session {
            store: self.store,
            id: self.id,
            ttl: self.ttl,
            state: Loaded { data },
        })
    }
}

impl Session<Loaded> {
    pub fn get(&self, key: &str) -> Option<&SessionValue> {
        self.state.data.get(key)
    }

    /// Convenience for string-valued keys; non-string values read as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SessionValue::as_str)
    }

    pub fn get_batch(&self, keys: &[&str]) -> HashMap<String, SessionValue> {
        keys.iter()
            .filter_map(|k| self.state.data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }

    pub async fn set(
        &mut self,
        key: &str,
        value: impl Into<SessionValue>,
    ) -> Result<(), SessionError> {
        self.state.data.insert(key.to_string(), value.into());
        self.persist().await
    }

    pub async fn set_batch<K, V, I>(&mut self, entries: I) -> Result<(), SessionError>
    where
        K: Into<String>,
        V: Into<SessionValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in entries {
            self.state.data.insert(k.into(), v.into());
        }
        self.persist().await
    }

    /// Removes `key` and returns what it held.
    pub async fn delete(&mut self, key: &str) -> Result<Option<SessionValue>, SessionError> {
        let removed = self.state.data.remove(key);
        self.persist().await?;
        Ok(removed)
    }

    /// Removes every key in `keys` with a single write; absent keys are skipped in the result.
    pub async fn delete_batch(
        &mut self,
        keys: &[&str],
    ) -> Result<HashMap<String, SessionValue>, SessionError> {
        let removed = keys
            .iter()
            .filter_map(|k| self.state.data.remove(*k).map(|v| (k.to_string(), v)))
            .collect();
        self.persist().await?;
        Ok(removed)
    }

    /// Empties the session and deletes its record from storage.
    pub async fn clear(&mut self) -> Result<(), SessionError> {
        self.state.data.clear();
        self.store.delete(&self.id).await?;
        tracing::debug!("Cleared session");
        Ok(())
    }

    async fn persist(&self) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&self.state.data)?;
        self.store.put(&self.id, &raw, Some(self.ttl)).await?;
        Ok(())
    }
}
