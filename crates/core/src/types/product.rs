//! Catalog view models shared by the storefront and admin crates.
//!
//! These mirror the product/category payloads served by the catalog
//! backend. The backend is loose about field presence and spells ids either
//! `id` or `_id` depending on the endpoint, so everything except the id and
//! title is defaulted and the id carries an alias.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ImageId, ProductId, VariantId};
use crate::types::price::{CurrencyCode, Price};

fn default_status() -> String {
    "active".to_owned()
}

/// A product as presented to every listing page.
///
/// Both catalog-backed and admin-authored products use this shape; the
/// latter are flagged with `is_custom` and a synthetic id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    /// Moderation status as reported by the backend (`active` when absent).
    /// Kept as a free string so admin overrides round-trip values the core
    /// does not enumerate.
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub total_stock: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductView {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.total_stock.map_or(self.is_available, |stock| stock > 0)
    }

    /// The listing price with its currency, when one is quoted.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.min_price
            .map(|amount| Price::new(amount, self.currency))
    }
}

/// A browsing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(alias = "_id")]
    pub id: VariantId,
    pub product_id: ProductId,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// A product gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[serde(alias = "_id")]
    pub id: ImageId,
    pub product_id: ProductId,
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}
