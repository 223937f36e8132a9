//! Profile persistence.
//!
//! One record per identity, overwrite semantics. Saving an incomplete
//! profile is allowed (it's a draft); the only hard validation is the
//! phone length, checked before anything is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marketplace_core::IdentityKey;
use marketplace_core::storage::{self, KeyValueStore, StorageError};

/// Storage namespace for profile records.
pub const PROFILE_NAMESPACE: &str = "marketplace_profile";

/// Minimum digits a phone number must carry once whitespace is stripped.
pub const MIN_PHONE_LEN: usize = 7;

/// Errors rejecting a profile save before any store mutation.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The phone number, stripped of whitespace, is too short.
    #[error("phone number looks too short")]
    PhoneTooShort,

    /// The local storage medium failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A persisted profile record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub avatar_url: String,
    /// Set once on first save, preserved on every later save.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Refreshed on every save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form input for [`ProfileStore::save`] - a record before stamping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    pub company_name: String,
    pub tax_id: String,
    pub about: String,
    pub avatar_url: String,
}

/// Required-field completion for the profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCompletion {
    /// Percentage of required fields filled, 0-100.
    pub percent: u8,
    /// Human-readable names of the missing required fields.
    pub missing: Vec<&'static str>,
}

impl ProfileCompletion {
    /// Whether every required field is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Profile persistence over an injected storage backend.
#[derive(Debug)]
pub struct ProfileStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Create a profile store over the given storage backend.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    fn storage_key(identity: &IdentityKey) -> String {
        format!("{PROFILE_NAMESPACE}:{identity}")
    }

    /// Load the record for the identity.
    ///
    /// A missing or corrupt record reads as `None`; the corrupt entry is
    /// removed so the next save starts clean.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn load(&self, identity: &IdentityKey) -> Result<Option<ProfileRecord>, StorageError> {
        storage::read_json(&self.store, &Self::storage_key(identity))
    }

    /// Validate and save the form, overwriting any prior record.
    ///
    /// The phone is stripped of whitespace before the length check and is
    /// persisted stripped. `created_at` is preserved from the existing
    /// record (or stamped now on first save); `updated_at` is always
    /// stamped now.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::PhoneTooShort`] without mutating anything,
    /// or a storage error if the medium rejects the write.
    pub fn save(
        &self,
        identity: &IdentityKey,
        form: ProfileForm,
    ) -> Result<ProfileRecord, ProfileError> {
        let phone: String = form.phone.split_whitespace().collect();
        if !phone.is_empty() && phone.len() < MIN_PHONE_LEN {
            return Err(ProfileError::PhoneTooShort);
        }

        let now = Utc::now();
        let created_at = self
            .load(identity)?
            .and_then(|existing| existing.created_at)
            .unwrap_or(now);

        let record = ProfileRecord {
            full_name: form.full_name,
            phone,
            city: form.city,
            address: form.address,
            company_name: form.company_name,
            tax_id: form.tax_id,
            about: form.about,
            avatar_url: form.avatar_url,
            created_at: Some(created_at),
            updated_at: Some(now),
        };

        storage::write_json(&self.store, &Self::storage_key(identity), &record)
            .map_err(ProfileError::from)?;
        Ok(record)
    }

    /// Delete the record for the identity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the removal.
    pub fn clear(&self, identity: &IdentityKey) -> Result<(), StorageError> {
        self.store.remove(&Self::storage_key(identity))
    }
}

impl ProfileRecord {
    /// Required-field completion for this record.
    ///
    /// Buyers require name, phone, city, and address; sellers additionally
    /// require the company name and tax id.
    #[must_use]
    pub fn completion(&self, is_seller: bool) -> ProfileCompletion {
        let mut required: Vec<(&'static str, &str)> = vec![
            ("Full name", &self.full_name),
            ("Phone", &self.phone),
            ("City", &self.city),
            ("Address", &self.address),
        ];
        if is_seller {
            required.push(("Store name", &self.company_name));
            required.push(("Tax ID", &self.tax_id));
        }

        let total = required.len();
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| label)
            .collect();
        let filled = total - missing.len();

        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let percent = ((filled as f64 / total as f64) * 100.0).round() as u8;

        ProfileCompletion { percent, missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use marketplace_core::storage::MemoryStore;

    fn form(name: &str, phone: &str) -> ProfileForm {
        ProfileForm {
            full_name: name.to_owned(),
            phone: phone.to_owned(),
            city: "Almaty".to_owned(),
            address: "12 Abay Ave".to_owned(),
            ..ProfileForm::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        let profiles = ProfileStore::new(&store);
        let user = IdentityKey::from("u-1");

        let saved = profiles.save(&user, form("Aliya", "7071234567")).expect("save");
        let loaded = profiles.load(&user).expect("load");
        assert_eq!(loaded, Some(saved));
    }

    #[test]
    fn test_created_at_is_write_once() {
        let store = MemoryStore::new();
        let profiles = ProfileStore::new(&store);
        let user = IdentityKey::from("u-1");

        let first = profiles.save(&user, form("Aliya", "7071234567")).expect("save");
        let second = profiles.save(&user, form("Aliya K.", "7071234567")).expect("save");

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.full_name, "Aliya K.");
    }

    #[test]
    fn test_phone_is_stripped_and_validated() {
        let store = MemoryStore::new();
        let profiles = ProfileStore::new(&store);
        let user = IdentityKey::from("u-1");

        let saved = profiles.save(&user, form("Aliya", "707 123 4567")).expect("save");
        assert_eq!(saved.phone, "7071234567");

        let rejected = profiles.save(&user, form("Aliya", "12 34"));
        assert!(matches!(rejected, Err(ProfileError::PhoneTooShort)));
        // The rejected save left the stored record untouched
        assert_eq!(
            profiles.load(&user).expect("load").map(|r| r.phone),
            Some("7071234567".to_owned())
        );
    }

    #[test]
    fn test_empty_phone_is_a_draft_not_an_error() {
        let store = MemoryStore::new();
        let profiles = ProfileStore::new(&store);
        let saved = profiles
            .save(&IdentityKey::from("u-1"), form("Aliya", ""))
            .expect("save");
        assert_eq!(saved.phone, "");
    }

    #[test]
    fn test_clear_removes_record() {
        let store = MemoryStore::new();
        let profiles = ProfileStore::new(&store);
        let user = IdentityKey::from("u-1");

        profiles.save(&user, form("Aliya", "7071234567")).expect("save");
        profiles.clear(&user).expect("clear");
        assert_eq!(profiles.load(&user).expect("load"), None);
    }

    #[test]
    fn test_corrupt_record_reads_as_none() {
        let store = MemoryStore::new();
        store.set("marketplace_profile:u-1", "<<<").expect("set");

        let profiles = ProfileStore::new(&store);
        assert_eq!(profiles.load(&IdentityKey::from("u-1")).expect("load"), None);
    }

    #[test]
    fn test_completion_buyer() {
        let record = ProfileRecord {
            full_name: "Aliya".to_owned(),
            phone: "7071234567".to_owned(),
            ..ProfileRecord::default()
        };
        let status = record.completion(false);
        assert_eq!(status.percent, 50);
        assert_eq!(status.missing, vec!["City", "Address"]);
    }

    #[test]
    fn test_completion_seller_requires_company_fields() {
        let record = ProfileRecord {
            full_name: "Aliya".to_owned(),
            phone: "7071234567".to_owned(),
            city: "Almaty".to_owned(),
            address: "12 Abay Ave".to_owned(),
            ..ProfileRecord::default()
        };
        let as_buyer = record.completion(false);
        assert!(as_buyer.is_complete());
        assert_eq!(as_buyer.percent, 100);

        let as_seller = record.completion(true);
        assert_eq!(as_seller.missing, vec!["Store name", "Tax ID"]);
        assert_eq!(as_seller.percent, 67);
    }
}
