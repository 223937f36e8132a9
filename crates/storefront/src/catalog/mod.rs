//! Catalog backend client.
//!
//! A thin REST client over `reqwest` with short-TTL caching of product and
//! category reads via `moka`. Responses normalize through
//! [`envelope::unwrap_list`] / [`envelope::unwrap_item`] so both backend
//! response shapes look the same to callers. Failures surface as
//! [`CatalogError`] for the page to render as an empty list plus a
//! message - there is no retry policy.

pub mod envelope;

pub use envelope::{ApiPayload, unwrap_item, unwrap_list};

use std::sync::Arc;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use marketplace_core::{Category, CategoryId, ProductId, ProductImage, ProductView, Variant};

use crate::config::CatalogConfig;

// =============================================================================
// Cache types
// =============================================================================

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products(String),
    Product(ProductId),
    Categories,
    Variants(ProductId),
    Images(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<ProductView>),
    Product(Option<Box<ProductView>>),
    Categories(Vec<Category>),
    Variants(Vec<Variant>),
    Images(Vec<ProductImage>),
}

// =============================================================================
// Request types
// =============================================================================

/// Query parameters for [`CatalogClient::get_products`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
}

impl ProductQuery {
    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.category_id.as_ref().map_or("", CategoryId::as_str),
            self.search.as_deref().unwrap_or(""),
            self.seller_id.as_deref().unwrap_or(""),
        )
    }
}

/// Body for [`CatalogClient::create_product`].
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Errors from the catalog backend.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The request failed or the backend answered with an error status.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog REST API.
///
/// Cheaply cloneable via `Arc`. Product and category reads are cached for
/// the configured TTL; writes bypass the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let base_url = config.base_url.as_str().trim_end_matches('/').to_owned();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                http,
                base_url,
                cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// List products, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backend cannot be reached or
    /// answers with an error status.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Vec<ProductView>, CatalogError> {
        let key = CacheKey::Products(query.cache_key());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("catalog cache hit");
            return Ok(products);
        }

        let body: serde_json::Value = self
            .inner
            .http
            .get(self.endpoint("products"))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let products: Vec<ProductView> = unwrap_list(body);
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch a single product. `Ok(None)` for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backend cannot be reached or
    /// answers with a non-404 error status.
    #[instrument(skip(self))]
    pub async fn get_product_by_id(
        &self,
        id: &ProductId,
    ) -> Result<Option<ProductView>, CatalogError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("catalog cache hit");
            return Ok(product.map(|boxed| *boxed));
        }

        let response = self
            .inner
            .http
            .get(self.endpoint(&format!("products/{id}")))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            self.inner.cache.insert(key, CacheValue::Product(None)).await;
            return Ok(None);
        }

        let body: serde_json::Value = response.error_for_status()?.json().await?;
        let product: Option<ProductView> = unwrap_item(body);
        self.inner
            .cache
            .insert(key, CacheValue::Product(product.clone().map(Box::new)))
            .await;
        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backend cannot be reached or
    /// answers with an error status.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("catalog cache hit");
            return Ok(categories);
        }

        let body: serde_json::Value = self
            .inner
            .http
            .get(self.endpoint("categories"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let categories: Vec<Category> = unwrap_list(body);
        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// List the variants of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backend cannot be reached or
    /// answers with an error status.
    #[instrument(skip(self))]
    pub async fn get_product_variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Variant>, CatalogError> {
        let key = CacheKey::Variants(product_id.clone());
        if let Some(CacheValue::Variants(variants)) = self.inner.cache.get(&key).await {
            debug!("catalog cache hit");
            return Ok(variants);
        }

        let body: serde_json::Value = self
            .inner
            .http
            .get(self.endpoint("variants"))
            .query(&[("product_id", product_id.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let variants: Vec<Variant> = unwrap_list(body);
        self.inner
            .cache
            .insert(key, CacheValue::Variants(variants.clone()))
            .await;
        Ok(variants)
    }

    /// List the gallery images of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backend cannot be reached or
    /// answers with an error status.
    #[instrument(skip(self))]
    pub async fn get_product_images(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<ProductImage>, CatalogError> {
        let key = CacheKey::Images(product_id.clone());
        if let Some(CacheValue::Images(images)) = self.inner.cache.get(&key).await {
            debug!("catalog cache hit");
            return Ok(images);
        }

        let body: serde_json::Value = self
            .inner
            .http
            .get(self.endpoint("images"))
            .query(&[("product_id", product_id.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let images: Vec<ProductImage> = unwrap_list(body);
        self.inner
            .cache
            .insert(key, CacheValue::Images(images.clone()))
            .await;
        Ok(images)
    }

    /// Create a seller listing. Returns the created product when the
    /// backend echoes one back.
    ///
    /// Invalidates cached product lists so the new listing shows up on the
    /// next read.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the backend cannot be reached or
    /// answers with an error status.
    #[instrument(skip(self, product))]
    pub async fn create_product(
        &self,
        product: &NewProduct,
    ) -> Result<Option<ProductView>, CatalogError> {
        let body: serde_json::Value = self
            .inner
            .http
            .post(self.endpoint("products"))
            .json(product)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.inner.cache.invalidate_all();
        Ok(unwrap_item(body))
    }
}
