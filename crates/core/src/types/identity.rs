//! Acting-principal types and the per-user storage key.
//!
//! Per-user state (cart, profile, ratings) is partitioned by an
//! [`IdentityKey`] derived from whoever is acting. Callers know the acting
//! user in different shapes (a raw key, a token, a full snapshot), so the
//! accepted shapes are a closed sum type and the precedence rules live in
//! one place.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Number of token characters used when deriving a key from a bearer token.
///
/// Stable for the lifetime of the session, not the identity - an accepted
/// degradation when only a token is known.
pub const TOKEN_KEY_PREFIX_LEN: usize = 16;

/// A string uniquely identifying the acting principal for storage
/// partitioning.
///
/// Deterministic for a given principal snapshot: two derivations from the
/// same principal always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Create a key from an already-derived string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The anonymous sentinel used by cart-style stores.
    #[must_use]
    pub fn guest() -> Self {
        Self("guest".to_owned())
    }

    /// The anonymous sentinel used by profile-style stores.
    #[must_use]
    pub fn device() -> Self {
        Self("device".to_owned())
    }

    /// Derive a key from a bearer token's fixed-length prefix.
    #[must_use]
    pub fn from_token(token: &SecretString) -> Self {
        let prefix: String = token
            .expose_secret()
            .chars()
            .take(TOKEN_KEY_PREFIX_LEN)
            .collect();
        Self(format!("token:{prefix}"))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for IdentityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// The persisted user snapshot written by the auth flow.
///
/// The backend spells the id `_id` on some endpoints and `id` on others,
/// and older snapshots carry `userId`; all three are accepted. Every field
/// is optional - key derivation picks the first usable one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserSnapshot {
    /// Derive the storage key for this snapshot.
    ///
    /// Precedence: `id`, then `user_id`, then `email`, then `name`; the
    /// first non-blank value wins. Returns `None` when no field is usable.
    #[must_use]
    pub fn storage_key(&self) -> Option<IdentityKey> {
        [&self.id, &self.user_id, &self.email, &self.name]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(IdentityKey::from)
    }

    /// Whether this user registered as a seller.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.eq_ignore_ascii_case("seller"))
    }

    /// Whether this user has moderation privileges.
    #[must_use]
    pub fn has_admin_role(&self) -> bool {
        self.is_admin
            || self
                .role
                .as_deref()
                .is_some_and(|role| role.to_ascii_lowercase().contains("admin"))
    }
}

/// The acting principal, as known to the caller.
///
/// The identity resolver turns this into an [`IdentityKey`], falling back
/// to persisted session state for [`Principal::Anonymous`].
#[derive(Debug, Clone)]
pub enum Principal {
    /// Nothing known about the caller.
    Anonymous,
    /// Only a bearer/session token is known.
    Token(SecretString),
    /// A full user snapshot (from login or the persisted session).
    Snapshot(UserSnapshot),
    /// A raw string already usable as a storage key.
    Key(IdentityKey),
}

impl Principal {
    /// Derive the storage key carried by this principal alone, without
    /// consulting ambient session state.
    ///
    /// `Anonymous` and field-less snapshots return `None` so the resolver
    /// can fall through to the persisted session.
    #[must_use]
    pub fn storage_key(&self) -> Option<IdentityKey> {
        match self {
            Self::Anonymous => None,
            Self::Token(token) => Some(IdentityKey::from_token(token)),
            Self::Snapshot(snapshot) => snapshot.storage_key(),
            Self::Key(key) => Some(key.clone()),
        }
    }
}

impl From<UserSnapshot> for Principal {
    fn from(snapshot: UserSnapshot) -> Self {
        Self::Snapshot(snapshot)
    }
}

impl From<IdentityKey> for Principal {
    fn from(key: IdentityKey) -> Self {
        Self::Key(key)
    }
}

impl From<&str> for Principal {
    fn from(key: &str) -> Self {
        Self::Key(IdentityKey::from(key))
    }
}
