//! The key-value storage seam.
//!
//! Every persistent store in the workspace (cart, profile, ratings, admin
//! overrides, session snapshot) reads and writes JSON strings through the
//! [`KeyValueStore`] trait. The backend is injected at construction so the
//! stores never touch an ambient singleton and can be exercised against
//! [`MemoryStore`] in tests.
//!
//! Corrupt persisted JSON is a recoverable condition, not an error: the
//! [`read_json`] helper logs it, discards the bad record, and reports
//! absence. Only medium failures (lock poisoning, filesystem I/O) surface
//! as [`StorageError`].

#[cfg(feature = "fs")]
pub mod file;

#[cfg(feature = "fs")]
pub use file::FileStore;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Errors from the storage medium itself.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A value could not be serialized for persistence.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The in-process store's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The backing file could not be read or written.
    #[cfg(feature = "fs")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A synchronous string-keyed storage medium.
///
/// `get` never fails for a missing key (it returns `None`), writes
/// replace any prior value in full, and there is no cross-writer
/// coordination - last write wins.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures, never for a
    /// missing key.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Removing a missing key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and parse the JSON value stored under `key`.
///
/// Returns `None` for a missing record. A record that fails to parse is
/// logged, removed from the medium, and also reported as `None` - corrupt
/// data never surfaces to the caller.
///
/// # Errors
///
/// Returns [`StorageError`] only for medium failures.
pub fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            warn!(key, %error, "discarding corrupt persisted record");
            if let Err(remove_error) = store.remove(key) {
                debug!(key, %remove_error, "failed to remove corrupt record");
            }
            Ok(None)
        }
    }
}

/// Serialize `value` and store it under `key`, replacing any prior value.
///
/// # Errors
///
/// Returns [`StorageError`] if serialization or the medium write fails.
pub fn write_json<T: Serialize>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    debug!(key, bytes = raw.len(), "persisted record");
    Ok(())
}

/// An in-process storage medium.
///
/// The default backend for tests and for hosts that keep state for the
/// lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if a writer panicked while
    /// holding the lock.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.entries.lock().map_err(|_| StorageError::Poisoned)?.len())
    }

    /// Whether the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if a writer panicked while
    /// holding the lock.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
