//! The persisted session snapshot.
//!
//! The auth flow (external to this crate) signs users in against the
//! backend; what it leaves behind locally is a user snapshot, a bearer
//! token, and a role hint under well-known keys. This module is the only
//! reader and writer of those keys - the identity resolver recovers an
//! [`IdentityKey`] from here when a caller has no principal in hand.

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use marketplace_core::storage::{self, KeyValueStore, StorageError};
use marketplace_core::{IdentityKey, UserSnapshot};

/// Storage keys for session data.
pub mod keys {
    /// Key for the current logged-in user snapshot (JSON).
    pub const USER: &str = "user";

    /// Key for the raw bearer token.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Key for the role hint stored alongside the user.
    pub const ROLE: &str = "role";
}

/// Reads and writes the persisted session snapshot.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create a session store over the given storage backend.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The persisted current-user snapshot, if any.
    ///
    /// A corrupt snapshot clears the whole session (user, token, role).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn current_user(&self) -> Result<Option<UserSnapshot>, StorageError> {
        let Some(raw) = self.store.get(keys::USER)? else {
            return Ok(None);
        };

        match serde_json::from_str::<UserSnapshot>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(error) => {
                warn!(%error, "stored user snapshot corrupt, clearing session");
                self.sign_out()?;
                Ok(None)
            }
        }
    }

    /// The persisted bearer token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn access_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.store.get(keys::ACCESS_TOKEN)?.map(SecretString::from))
    }

    /// The effective role: the stored hint, falling back to the role
    /// carried by the user snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn role(&self) -> Result<Option<String>, StorageError> {
        if let Some(role) = self.store.get(keys::ROLE)? {
            return Ok(Some(role));
        }
        Ok(self.current_user()?.and_then(|user| user.role))
    }

    /// Persist a signed-in session.
    ///
    /// The role hint is stored when the caller resolved one and removed
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects a write.
    pub fn sign_in(
        &self,
        user: &UserSnapshot,
        token: &SecretString,
        role: Option<&str>,
    ) -> Result<(), StorageError> {
        storage::write_json(&self.store, keys::USER, user)?;
        self.store.set(keys::ACCESS_TOKEN, token.expose_secret())?;
        match role {
            Some(role) => self.store.set(keys::ROLE, role)?,
            None => self.store.remove(keys::ROLE)?,
        }
        Ok(())
    }

    /// Clear the persisted session entirely.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects a removal.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.store.remove(keys::USER)?;
        self.store.remove(keys::ACCESS_TOKEN)?;
        self.store.remove(keys::ROLE)?;
        Ok(())
    }

    /// Derive the storage key for the persisted session, if one can be
    /// derived: the user snapshot's key first, then the token prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn identity_key(&self) -> Result<Option<IdentityKey>, StorageError> {
        if let Some(key) = self.current_user()?.and_then(|user| user.storage_key()) {
            return Ok(Some(key));
        }
        Ok(self.access_token()?.map(|token| IdentityKey::from_token(&token)))
    }
}
