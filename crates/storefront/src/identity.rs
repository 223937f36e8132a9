//! The identity resolver.
//!
//! Turns whatever the caller knows about the acting user into the
//! [`IdentityKey`] that partitions per-user state. Resolution order:
//!
//! 1. the supplied principal (raw key, user snapshot fields, or token)
//! 2. the persisted session's user snapshot
//! 3. the persisted session's bearer token (fixed-length prefix)
//! 4. an anonymous sentinel chosen by the calling store
//!
//! Resolution is deterministic given the same principal and session state
//! and never writes anything.

use marketplace_core::storage::{KeyValueStore, StorageError};
use marketplace_core::{IdentityKey, Principal};

use crate::session::SessionStore;

/// Which anonymous sentinel a store falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousScope {
    /// Cart-style stores: anonymous visitors still get working state.
    Guest,
    /// Profile-style stores: state follows the device, not a person.
    Device,
}

impl AnonymousScope {
    #[must_use]
    fn sentinel(self) -> IdentityKey {
        match self {
            Self::Guest => IdentityKey::guest(),
            Self::Device => IdentityKey::device(),
        }
    }
}

/// Resolves principals to storage keys, consulting the persisted session
/// when the caller has nothing better.
#[derive(Debug)]
pub struct IdentityResolver<'a, S> {
    session: &'a SessionStore<S>,
}

impl<'a, S: KeyValueStore> IdentityResolver<'a, S> {
    /// Create a resolver over the given session store.
    #[must_use]
    pub const fn new(session: &'a SessionStore<S>) -> Self {
        Self { session }
    }

    /// Resolve to a storage key, always producing one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures while reading the
    /// persisted session.
    pub fn resolve(
        &self,
        principal: Option<&Principal>,
        scope: AnonymousScope,
    ) -> Result<IdentityKey, StorageError> {
        if let Some(key) = principal.and_then(Principal::storage_key) {
            return Ok(key);
        }
        if let Some(key) = self.session.identity_key()? {
            return Ok(key);
        }
        Ok(scope.sentinel())
    }

    /// Resolve to a *user* key, or `None` for anonymous callers.
    ///
    /// Stricter than [`Self::resolve`]: only snapshot fields (supplied or
    /// persisted) and raw keys qualify - a bare token does not identify a
    /// user, so rating-style operations treat it as anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures while reading the
    /// persisted session.
    pub fn resolve_user(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Option<IdentityKey>, StorageError> {
        match principal {
            Some(Principal::Snapshot(snapshot)) => {
                if let Some(key) = snapshot.storage_key() {
                    return Ok(Some(key));
                }
            }
            Some(Principal::Key(key)) => return Ok(Some(key.clone())),
            Some(Principal::Token(_) | Principal::Anonymous) | None => {}
        }

        Ok(self
            .session
            .current_user()?
            .and_then(|user| user.storage_key()))
    }
}
