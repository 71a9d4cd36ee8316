use std::sync::Arc;

use crate::storage::KvStore;
use crate::userdb::errors::UserError;
use crate::userdb::types::{Authenticator, User};
use crate::utils::{base64url_encode, gen_random_string};

const USER_PREFIX: &str = "v1:user:";
const USER_NAME_ID_PREFIX: &str = "v1:name_id:";
const AUTHENTICATOR_ID_USER_ID_PREFIX: &str = "v1:authenticator_id_user_id:";

pub fn user_key(id: &str) -> String {
    format!("{USER_PREFIX}{id}")
}

pub fn name_id_key(name: &str) -> String {
    format!("{USER_NAME_ID_PREFIX}{name}")
}

pub fn authenticator_id_user_id_key(authenticator_id: &str) -> String {
    format!("{AUTHENTICATOR_ID_USER_ID_PREFIX}{authenticator_id}")
}

/// Users, the name index and the credential index on top of a [`KvStore`].
///
/// The three record kinds are written one key at a time. A failure between
/// writes leaves the indices out of step with the user blob, and a later
/// successful write of the same user repairs them. Callers that mutate a user
/// must go through [`UserRepository::set_user`] so both the blob and the name
/// index are rewritten.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn KvStore>,
    record_ttl: Option<u64>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn KvStore>, record_ttl: Option<u64>) -> Self {
        Self { store, record_ttl }
    }

    /// 32 random bytes, base64url encoded.
    pub fn new_user_id() -> Result<String, UserError> {
        Ok(gen_random_string(32)?)
    }

    pub async fn set_user(&self, user: &User) -> Result<(), UserError> {
        let raw = serde_json::to_string(user)?;
        self.store
            .put(&user_key(&user.id), &raw, self.record_ttl)
            .await?;
        self.store
            .put(&name_id_key(&user.name), &user.id, self.record_ttl)
            .await?;
        tracing::debug!("Stored user {}", user.id);
        Ok(())
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, UserError> {
        match self.store.get(&user_key(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, UserError> {
        let Some(id) = self.store.get(&name_id_key(name)).await? else {
            return Ok(None);
        };
        self.get_user_by_id(&id).await
    }

    /// Deletes the user blob, then the name entry, then each credential index entry.
    /// A missing user is not an error.
    pub async fn delete_user_by_id(&self, id: &str) -> Result<(), UserError> {
        let Some(user) = self.get_user_by_id(id).await? else {
            tracing::debug!("delete_user_by_id: no user {}", id);
            return Ok(());
        };

        self.store.delete(&user_key(&user.id)).await?;
        self.store.delete(&name_id_key(&user.name)).await?;
        for authenticator in &user.authenticators {
            self.store
                .delete(&authenticator_id_user_id_key(&authenticator.id))
                .await?;
        }
        tracing::debug!(
            "Deleted user {} with {} authenticators",
            user.id,
            user.authenticators.len()
        );
        Ok(())
    }

    pub async fn delete_user_by_name(&self, name: &str) -> Result<(), UserError> {
        if let Some(id) = self.store.get(&name_id_key(name)).await? {
            self.delete_user_by_id(&id).await?;
        }
        Ok(())
    }

    /// Points `authenticator_id` at `user_id`. The caller still has to push the
    /// authenticator into the user and call [`UserRepository::set_user`].
    pub async fn put_authenticator_id_user_id(
        &self,
        authenticator_id: &str,
        user_id: &str,
    ) -> Result<(), UserError> {
        self.store
            .put(
                &authenticator_id_user_id_key(authenticator_id),
                user_id,
                self.record_ttl,
            )
            .await?;
        Ok(())
    }

    pub fn find_authenticator<'a>(
        authenticators: &'a [Authenticator],
        credential_id: &[u8],
    ) -> Option<&'a Authenticator> {
        let id = base64url_encode(credential_id);
        authenticators.iter().find(|a| a.id == id)
    }

    /// Follows credential id -> user id -> user -> authenticator. Any missing hop gives `None`.
    pub async fn get_user_and_authenticator_by_credential_id(
        &self,
        credential_id: &[u8],
    ) -> Result<Option<(User, Authenticator)>, UserError> {
        let authenticator_id = base64url_encode(credential_id);
        let Some(user_id) = self
            .store
            .get(&authenticator_id_user_id_key(&authenticator_id))
            .await?
        else {
            return Ok(None);
        };

        let Some(user) = self.get_user_by_id(&user_id).await? else {
            tracing::warn!("Credential index points at missing user {}", user_id);
            return Ok(None);
        };

        let Some(authenticator) = Self::find_authenticator(&user.authenticators, credential_id)
            .cloned()
        else {
            tracing::warn!("Credential index entry not found in user {}", user.id);
            return Ok(None);
        };

        Ok(Some((user, authenticator)))
    }

    /// Removes `authenticator_id` from `user`, saves the user and drops the index entry.
    /// Both writes happen even when the authenticator was not in the list.
    pub async fn delete_authenticator(
        &self,
        user: &mut User,
        authenticator_id: &str,
    ) -> Result<(), UserError> {
        user.authenticators.retain(|a| a.id != authenticator_id);
        self.set_user(user).await?;
        self.store
            .delete(&authenticator_id_user_id_key(authenticator_id))
            .await?;
        Ok(())
    }
}
