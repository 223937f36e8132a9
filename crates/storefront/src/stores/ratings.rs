//! Ratings persistence.
//!
//! All ratings live in one document keyed by product id. At most one
//! entry per `(product, user)` pair - a repeat rating replaces the prior
//! entry. Anonymous callers cannot rate; the mutator degrades to a no-op
//! rather than an error so the page can prompt for sign-in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marketplace_core::storage::{self, KeyValueStore, StorageError};
use marketplace_core::{IdentityKey, ProductId};

/// Storage key for the ratings document.
pub const RATINGS_KEY: &str = "marketplace_ratings";

/// Errors rejecting a rating before any store mutation.
#[derive(Debug, Error)]
pub enum RatingError {
    /// The value is outside the 1-5 scale.
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(u8),
}

/// A star rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Validate a raw value onto the 1-5 scale.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] for anything outside 1-5.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if matches!(value, 1..=5) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    /// The raw value, 1-5.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// One user's rating of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub user_key: IdentityKey,
    pub rating: Rating,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Arithmetic mean of all entries; `0.0` when there are none.
    pub average: f64,
    /// Number of entries.
    pub count: usize,
}

impl RatingSummary {
    /// The empty summary shown before anyone has rated.
    pub const EMPTY: Self = Self {
        average: 0.0,
        count: 0,
    };
}

type RatingsDoc = BTreeMap<ProductId, Vec<RatingEntry>>;

/// Ratings persistence over an injected storage backend.
#[derive(Debug)]
pub struct RatingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> RatingsStore<S> {
    /// Create a ratings store over the given storage backend.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    fn read_all(&self) -> Result<RatingsDoc, StorageError> {
        Ok(storage::read_json(&self.store, RATINGS_KEY)?.unwrap_or_default())
    }

    /// All entries for a product.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn ratings_for(&self, product: &ProductId) -> Result<Vec<RatingEntry>, StorageError> {
        Ok(self.read_all()?.remove(product).unwrap_or_default())
    }

    /// The rating a user gave a product, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn user_rating(
        &self,
        product: &ProductId,
        user: &IdentityKey,
    ) -> Result<Option<Rating>, StorageError> {
        Ok(self
            .ratings_for(product)?
            .iter()
            .find(|entry| entry.user_key == *user)
            .map(|entry| entry.rating))
    }

    /// Upsert a user's rating for a product.
    ///
    /// One entry per `(product, user)`: an existing entry is replaced in
    /// place, otherwise a new one is appended. With no user key (anonymous
    /// caller) the document is left untouched and the current entries are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the medium rejects the write.
    pub fn set_rating(
        &self,
        product: &ProductId,
        user: Option<&IdentityKey>,
        rating: Rating,
    ) -> Result<Vec<RatingEntry>, StorageError> {
        let Some(user) = user else {
            return self.ratings_for(product);
        };

        let mut doc = self.read_all()?;
        let entries = doc.entry(product.clone()).or_default();
        let entry = RatingEntry {
            user_key: user.clone(),
            rating,
            updated_at: Utc::now(),
        };

        match entries.iter_mut().find(|e| e.user_key == *user) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        let result = entries.clone();
        storage::write_json(&self.store, RATINGS_KEY, &doc)?;
        Ok(result)
    }

    /// Aggregate rating for a product.
    ///
    /// Returns [`RatingSummary::EMPTY`] when nobody has rated - never
    /// divides by zero.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn average(&self, product: &ProductId) -> Result<RatingSummary, StorageError> {
        let entries = self.ratings_for(product)?;
        if entries.is_empty() {
            return Ok(RatingSummary::EMPTY);
        }

        let sum: u32 = entries.iter().map(|e| u32::from(e.rating.value())).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = f64::from(sum) / entries.len() as f64;
        Ok(RatingSummary {
            average,
            count: entries.len(),
        })
    }
}
