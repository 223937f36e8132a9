//! Cart persistence.
//!
//! A cart is a list of line entries under one identity key. Adding the
//! same product twice creates two entries - line identity is the
//! `(id, added_at)` pair, never the product id alone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marketplace_core::storage::{self, KeyValueStore, StorageError};
use marketplace_core::{IdentityKey, ProductId, ProductView};

/// Storage namespace for cart lists.
pub const CART_NAMESPACE: &str = "marketplace_cart";

/// One line entry in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    /// Stamped at add time; the secondary key that keeps duplicate
    /// products as distinct line entries.
    pub added_at: DateTime<Utc>,
}

/// Input for [`CartStore::add`]: a line entry before it is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineInput {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
}

impl From<&ProductView> for CartLineInput {
    fn from(product: &ProductView) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.min_price.unwrap_or_default(),
            image_url: product.image_url.clone(),
            category_name: product.category_name.clone(),
        }
    }
}

/// Cart persistence over an injected storage backend.
#[derive(Debug)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart store over the given storage backend.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    fn storage_key(identity: &IdentityKey) -> String {
        format!("{CART_NAMESPACE}_{identity}")
    }

    /// All line entries for the identity, oldest first.
    ///
    /// A missing or corrupt cart reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn items(&self, identity: &IdentityKey) -> Result<Vec<CartItem>, StorageError> {
        Ok(storage::read_json(&self.store, &Self::storage_key(identity))?.unwrap_or_default())
    }

    /// Number of line entries for the identity (the cart badge).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn count(&self, identity: &IdentityKey) -> Result<usize, StorageError> {
        Ok(self.items(identity)?.len())
    }

    /// Sum of line prices for the identity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn subtotal(&self, identity: &IdentityKey) -> Result<Decimal, StorageError> {
        Ok(self.items(identity)?.iter().map(|item| item.price).sum())
    }

    /// Append a line entry with a fresh `added_at` stamp.
    ///
    /// Always appends - an existing entry for the same product id is left
    /// alone, matching the line-entry model.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn add(
        &self,
        identity: &IdentityKey,
        line: CartLineInput,
    ) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.items(identity)?;
        items.push(CartItem {
            id: line.id,
            title: line.title,
            price: line.price,
            image_url: line.image_url,
            category_name: line.category_name,
            added_at: Utc::now(),
        });
        storage::write_json(&self.store, &Self::storage_key(identity), &items)?;
        Ok(items)
    }

    /// Remove line entries for a product.
    ///
    /// With `added_at`, only the matching line entry goes; without it,
    /// every entry for the product id goes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn remove(
        &self,
        identity: &IdentityKey,
        id: &ProductId,
        added_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.items(identity)?;
        items.retain(|item| {
            item.id != *id || added_at.is_some_and(|stamp| item.added_at != stamp)
        });
        storage::write_json(&self.store, &Self::storage_key(identity), &items)?;
        Ok(items)
    }

    /// Empty the cart (checkout completion or explicit clear).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn clear(&self, identity: &IdentityKey) -> Result<(), StorageError> {
        let empty: Vec<CartItem> = Vec::new();
        storage::write_json(&self.store, &Self::storage_key(identity), &empty)
    }
}
