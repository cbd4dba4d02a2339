//! Stock Store: product listings with a unit counter
//!
//! The transfer engine takes the product row lock first in every
//! purchase and holds it through commit, which is what makes overselling
//! impossible. Listing paths use unlocked snapshots.

use super::row::{RowLock, RowTable, StoreConfig};
use crate::types::{MarketError, Product, ProductId};

/// Holds all product rows
pub struct ProductStore {
    rows: RowTable<ProductId, Product>,
}

impl ProductStore {
    /// Create an empty store
    pub fn new(config: &StoreConfig) -> Self {
        ProductStore {
            rows: RowTable::new("product", config),
        }
    }

    /// Insert a new listing
    pub(crate) fn insert(&self, product: Product) {
        self.rows.insert(product.id, product);
    }

    /// Take the exclusive lock on a product row
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if the row stays contended past the store
    /// timeout. A missing product is `Ok(None)`; the caller maps it to
    /// its own not-found error.
    pub fn locked_read(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<RowLock<Product>>, MarketError> {
        self.rows.locked_read(product_id)
    }

    /// Unlocked snapshot of one product, for query paths only
    pub fn read(&self, product_id: &ProductId) -> Option<Product> {
        self.rows.read(product_id)
    }

    /// Unlocked snapshot of every listing, newest first
    pub fn list(&self) -> Vec<Product> {
        let mut products = self.rows.snapshot();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn product(name: &str) -> Product {
        Product::new(Uuid::new_v4(), name.to_string(), Decimal::new(1_000, 2), 5)
    }

    #[test]
    fn test_locked_read_missing_product_is_none() {
        let store = ProductStore::new(&StoreConfig::default());
        assert!(matches!(store.locked_read(&Uuid::new_v4()), Ok(None)));
    }

    #[test]
    fn test_list_returns_every_listing() {
        let store = ProductStore::new(&StoreConfig::default());
        store.insert(product("one"));
        store.insert(product("two"));

        assert_eq!(store.list().len(), 2);
    }
}
