//! The product overlay.
//!
//! Pure merge of the override document onto a fetched product list:
//! hidden products drop, overridden statuses replace, custom products go
//! first. Every listing page runs its fetch through this before any
//! user-chosen sort or filter, so custom products keep their featured
//! position.

use marketplace_core::ProductView;
use marketplace_core::storage::{KeyValueStore, StorageError};

use crate::overrides::{AdminStateStore, OverrideDocument};

/// Merge the override document onto fetched products.
///
/// In order:
///
/// 1. drop every product whose id is in the hidden set
/// 2. replace the status of every product with an override entry
/// 3. prepend the custom products, newest first
///
/// Hidden wins over an override for the same id (the override entry stays
/// in the document but has no visible effect). A custom product colliding
/// with a server product id is not deduplicated - both appear.
#[must_use]
pub fn apply_overrides(
    document: &OverrideDocument,
    products: Vec<ProductView>,
) -> Vec<ProductView> {
    let mut result = document.custom_products.clone();
    result.extend(
        products
            .into_iter()
            .filter(|product| !document.hidden_product_ids.contains(&product.id))
            .map(|mut product| {
                if let Some(status) = document.status_overrides.get(&product.id) {
                    product.status.clone_from(status);
                }
                product
            }),
    );
    result
}

impl<S: KeyValueStore> AdminStateStore<S> {
    /// Read the current document and apply it to `products`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only for medium failures while reading the
    /// document.
    pub fn apply(&self, products: Vec<ProductView>) -> Result<Vec<ProductView>, StorageError> {
        Ok(apply_overrides(&self.state()?, products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use marketplace_core::ProductId;
    use marketplace_core::storage::MemoryStore;

    fn product(id: &str, status: &str) -> ProductView {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Product {id}"),
            "status": status,
        }))
        .expect("valid product")
    }

    fn custom(id: &str) -> ProductView {
        let mut product = product(id, "active");
        product.is_custom = true;
        product
    }

    #[test]
    fn test_filter_then_replace() {
        let mut document = OverrideDocument::default();
        document.hidden_product_ids.insert(ProductId::new("1"));
        document
            .status_overrides
            .insert(ProductId::new("2"), "banned".to_owned());

        let result = apply_overrides(
            &document,
            vec![product("1", "active"), product("2", "active")],
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, ProductId::new("2"));
        assert_eq!(result[0].status, "banned");
    }

    #[test]
    fn test_custom_products_sort_first() {
        let mut document = OverrideDocument::default();
        document.custom_products.push(custom("c1"));

        let result = apply_overrides(&document, vec![product("2", "active")]);
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "2"]);
    }

    #[test]
    fn test_hidden_wins_over_override() {
        let mut document = OverrideDocument::default();
        document.hidden_product_ids.insert(ProductId::new("1"));
        document
            .status_overrides
            .insert(ProductId::new("1"), "banned".to_owned());

        let result = apply_overrides(&document, vec![product("1", "active")]);
        assert!(result.is_empty());
        // The override entry itself is not cleaned up
        assert_eq!(document.status_overrides.len(), 1);
    }

    #[test]
    fn test_colliding_custom_id_is_not_deduplicated() {
        let mut document = OverrideDocument::default();
        document.custom_products.push(custom("1"));

        let result = apply_overrides(&document, vec![product("1", "active")]);
        assert_eq!(result.len(), 2);
        assert!(result[0].is_custom);
        assert!(!result[1].is_custom);
    }

    #[test]
    fn test_empty_document_passes_products_through() {
        let products = vec![product("1", "active"), product("2", "paused")];
        let result = apply_overrides(&OverrideDocument::default(), products.clone());
        assert_eq!(result, products);
    }

    #[test]
    fn test_store_convenience_reads_then_applies() {
        let store = MemoryStore::new();
        let admin = AdminStateStore::new(&store);
        admin.set_hidden(&ProductId::new("1"), true).expect("hide");
        admin
            .set_status_override(&ProductId::new("2"), Some("banned"))
            .expect("set");

        let result = admin
            .apply(vec![product("1", "active"), product("2", "active")])
            .expect("apply");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].status, "banned");
    }
}
