//! The admin override document and its store.
//!
//! One process-wide document holds every moderation decision. It is read
//! leniently: each field falls back to its empty default independently, so
//! one mangled field never takes down the rest of the document. Every
//! mutator persists and returns the full resulting document, which lets
//! callers refresh derived state without a second read.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use marketplace_core::storage::{self, KeyValueStore, StorageError};
use marketplace_core::{CategoryId, CurrencyCode, ProductId, ProductView};

use crate::error::AdminError;

/// Storage key for the override document.
pub const ADMIN_STATE_KEY: &str = "marketplace_admin_state";

/// The process-wide moderation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideDocument {
    /// Products excluded from every listing.
    pub hidden_product_ids: BTreeSet<ProductId>,
    /// Per-product status replacements.
    pub status_overrides: BTreeMap<ProductId, String>,
    /// Admin-authored products, newest first.
    pub custom_products: Vec<ProductView>,
    /// Brand verification flags.
    pub verified_brands: BTreeMap<String, bool>,
}

impl OverrideDocument {
    /// Extract a document from raw JSON, field by field.
    ///
    /// A field that is absent or wrong-shaped defaults; the other fields
    /// are kept.
    #[must_use]
    fn from_value(value: &Value) -> Self {
        Self {
            hidden_product_ids: lenient_field(value, "hiddenProductIds"),
            status_overrides: lenient_field(value, "statusOverrides"),
            custom_products: lenient_field(value, "customProducts"),
            verified_brands: lenient_field(value, "verifiedBrands"),
        }
    }
}

fn lenient_field<T: DeserializeOwned + Default>(value: &Value, field: &str) -> T {
    value
        .get(field)
        .cloned()
        .and_then(|field_value| serde_json::from_value(field_value).ok())
        .unwrap_or_default()
}

/// Form input for an admin-authored product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomProductForm {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub status: String,
    pub is_available: bool,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub price: Option<rust_decimal::Decimal>,
    pub stock: Option<i64>,
    pub image_url: String,
}

impl CustomProductForm {
    /// Build the product view this form describes, with a fresh synthetic
    /// id and the admin defaults applied.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::MissingTitleOrCategory`] when the title is
    /// blank or no category was chosen.
    pub fn build(self) -> Result<ProductView, AdminError> {
        let title = self.title.trim().to_owned();
        let Some(category_id) = self.category_id else {
            return Err(AdminError::MissingTitleOrCategory);
        };
        if title.is_empty() {
            return Err(AdminError::MissingTitleOrCategory);
        }

        let brand = self.brand.trim();
        let total_stock = self
            .stock
            .unwrap_or(if self.is_available { 1 } else { 0 });
        let image_url = self.image_url.trim();

        Ok(ProductView {
            id: ProductId::new(format!("admin-{}", Uuid::new_v4())),
            title,
            description: self.description.trim().to_owned(),
            brand: if brand.is_empty() {
                "Admin".to_owned()
            } else {
                brand.to_owned()
            },
            status: if self.status.is_empty() {
                "active".to_owned()
            } else {
                self.status
            },
            is_available: self.is_available,
            category_id: Some(category_id),
            category_name: Some(
                self.category_name
                    .unwrap_or_else(|| "Category".to_owned()),
            ),
            min_price: self.price,
            total_stock: Some(total_stock),
            image_url: if image_url.is_empty() {
                None
            } else {
                Some(image_url.to_owned())
            },
            currency: CurrencyCode::KZT,
            is_custom: true,
            created_at: Some(Utc::now()),
        })
    }
}

/// Moderation state persistence over an injected storage backend.
#[derive(Debug)]
pub struct AdminStateStore<S> {
    store: S,
}

impl<S: KeyValueStore> AdminStateStore<S> {
    /// Create an admin state store over the given storage backend.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the current document, defaulting lazily on first read.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn state(&self) -> Result<OverrideDocument, StorageError> {
        let Some(raw) = self.store.get(ADMIN_STATE_KEY)? else {
            return Ok(OverrideDocument::default());
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(OverrideDocument::from_value(&value)),
            Err(error) => {
                warn!(%error, "admin state unparseable, using defaults");
                Ok(OverrideDocument::default())
            }
        }
    }

    fn write(&self, document: OverrideDocument) -> Result<OverrideDocument, StorageError> {
        storage::write_json(&self.store, ADMIN_STATE_KEY, &document)?;
        Ok(document)
    }

    /// Add or remove a product from the hidden set. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn set_hidden(
        &self,
        id: &ProductId,
        hidden: bool,
    ) -> Result<OverrideDocument, StorageError> {
        let mut document = self.state()?;
        if hidden {
            document.hidden_product_ids.insert(id.clone());
        } else {
            document.hidden_product_ids.remove(id);
        }
        self.write(document)
    }

    /// Set or clear a product's status override.
    ///
    /// `None` or a blank status deletes the entry - an empty-string
    /// override is never stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn set_status_override(
        &self,
        id: &ProductId,
        status: Option<&str>,
    ) -> Result<OverrideDocument, StorageError> {
        let mut document = self.state()?;
        match status.map(str::trim).filter(|status| !status.is_empty()) {
            Some(status) => {
                document
                    .status_overrides
                    .insert(id.clone(), status.to_owned());
            }
            None => {
                document.status_overrides.remove(id);
            }
        }
        self.write(document)
    }

    /// Prepend an admin-authored product (newest first).
    ///
    /// The product is flagged `is_custom` regardless of what the caller
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn add_custom_product(
        &self,
        mut product: ProductView,
    ) -> Result<OverrideDocument, StorageError> {
        product.is_custom = true;
        let mut document = self.state()?;
        document.custom_products.insert(0, product);
        self.write(document)
    }

    /// Validate a form and inject the resulting custom product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::MissingTitleOrCategory`] before any write, or
    /// a storage error if the medium rejects the write.
    pub fn create_custom_product(
        &self,
        form: CustomProductForm,
    ) -> Result<OverrideDocument, AdminError> {
        let product = form.build()?;
        Ok(self.add_custom_product(product)?)
    }

    /// Remove an admin-authored product by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn remove_custom_product(
        &self,
        id: &ProductId,
    ) -> Result<OverrideDocument, StorageError> {
        let mut document = self.state()?;
        document.custom_products.retain(|product| product.id != *id);
        self.write(document)
    }

    /// Set or clear a brand's verification flag.
    ///
    /// A blank brand name is a no-op: the current document is returned
    /// unchanged. An unverified brand is deleted rather than stored as
    /// `false`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    pub fn set_verified_brand(
        &self,
        brand: &str,
        verified: bool,
    ) -> Result<OverrideDocument, StorageError> {
        let brand = brand.trim();
        let mut document = self.state()?;
        if brand.is_empty() {
            return Ok(document);
        }
        if verified {
            document.verified_brands.insert(brand.to_owned(), true);
        } else {
            document.verified_brands.remove(brand);
        }
        self.write(document)
    }

    // =========================================================================
    // Query helpers
    // =========================================================================

    /// Whether a product is currently hidden.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn is_product_hidden(&self, id: &ProductId) -> Result<bool, StorageError> {
        Ok(self.state()?.hidden_product_ids.contains(id))
    }

    /// The status override for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn status_override(&self, id: &ProductId) -> Result<Option<String>, StorageError> {
        Ok(self.state()?.status_overrides.get(id).cloned())
    }

    /// Look up an admin-authored product by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn custom_product_by_id(
        &self,
        id: &ProductId,
    ) -> Result<Option<ProductView>, StorageError> {
        Ok(self
            .state()?
            .custom_products
            .into_iter()
            .find(|product| product.id == *id))
    }

    /// Whether a brand is verified.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures.
    pub fn is_brand_verified(&self, brand: &str) -> Result<bool, StorageError> {
        Ok(self
            .state()?
            .verified_brands
            .get(brand)
            .copied()
            .unwrap_or(false))
    }
}
