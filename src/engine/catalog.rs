//! Merchant listing management and cached catalog reads
//!
//! Listing creation and edits are merchant-only writes. A merchant edit
//! is a single-row atomic unit on the product; it shares the row lock
//! with the transfer engine's stock decrement, so edits and purchases of
//! the same product serialize. Catalog reads are unlocked, cached
//! snapshots.

use super::MarketEngine;
use crate::cache::keys;
use crate::types::{MarketError, Product, ProductId, UserId, MONEY_DP};
use rust_decimal::Decimal;
use std::time::Duration;

/// How long cached catalog snapshots live
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

/// A merchant's partial edit of an existing listing
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New display name, if changing
    pub name: Option<String>,

    /// New unit price, if changing
    pub price: Option<Decimal>,

    /// New stock level, if restocking
    pub available_units: Option<u32>,
}

fn validate_name(name: &str) -> Result<(), MarketError> {
    if name.trim().is_empty() {
        return Err(MarketError::invalid_operation("product name is empty"));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), MarketError> {
    if price <= Decimal::ZERO {
        return Err(MarketError::invalid_operation(
            "product price must be positive",
        ));
    }
    if price != price.round_dp(MONEY_DP) {
        return Err(MarketError::invalid_operation(
            "product price carries more than two fraction digits",
        ));
    }
    Ok(())
}

impl MarketEngine {
    /// Create a new product listing for a merchant
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` for an empty name or a non-positive
    /// or over-precise price.
    pub fn create_product(
        &self,
        merchant_id: UserId,
        name: String,
        price: Decimal,
        available_units: u32,
    ) -> Result<Product, MarketError> {
        validate_name(&name)?;
        validate_price(price)?;

        let product = Product::new(merchant_id, name, price, available_units);
        self.products().insert(product.clone());
        self.cache().invalidate(keys::PRODUCT_LIST);

        tracing::info!(product = %product.id, merchant = %merchant_id, "listing created");
        Ok(product)
    }

    /// Edit an existing listing; merchant's own listings only
    ///
    /// # Errors
    ///
    /// * `ProductNotFound` - No product with this id
    /// * `Forbidden` - The product belongs to a different merchant
    /// * `InvalidOperation` - Invalid name or price
    /// * `LockTimeout` - The row stayed contended past the store timeout
    pub fn update_product(
        &self,
        merchant_id: UserId,
        product_id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, MarketError> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }

        let mut product = self
            .products()
            .locked_read(&product_id)?
            .ok_or(MarketError::ProductNotFound {
                product: product_id,
            })?;
        if product.merchant_id != merchant_id {
            return Err(MarketError::forbidden(
                merchant_id,
                format!("product {product_id}"),
            ));
        }

        // Validation done; apply the edit under the held lock.
        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(units) = update.available_units {
            product.available_units = units;
        }
        product.touch();
        let edited = product.clone();
        drop(product);

        self.cache().invalidate(keys::PRODUCT_LIST);
        self.cache().invalidate(&keys::product(&product_id));

        tracing::info!(product = %product_id, merchant = %merchant_id, "listing updated");
        Ok(edited)
    }

    /// Cached snapshot of every listing, newest first
    pub fn list_products(&self) -> Vec<Product> {
        if let Some(cached) = self.cache().get(keys::PRODUCT_LIST) {
            if let Ok(products) = serde_json::from_value::<Vec<Product>>(cached) {
                return products;
            }
            self.cache().invalidate(keys::PRODUCT_LIST);
        }

        let products = self.products().list();
        if let Ok(value) = serde_json::to_value(&products) {
            self.cache().set(keys::PRODUCT_LIST, value, CATALOG_CACHE_TTL);
        }
        products
    }

    /// Cached snapshot of one listing
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if no product exists with this id.
    pub fn product(&self, product_id: ProductId) -> Result<Product, MarketError> {
        let key = keys::product(&product_id);
        if let Some(cached) = self.cache().get(&key) {
            if let Ok(product) = serde_json::from_value::<Product>(cached) {
                return Ok(product);
            }
            self.cache().invalidate(&key);
        }

        let product = self
            .products()
            .read(&product_id)
            .ok_or(MarketError::ProductNotFound {
                product: product_id,
            })?;
        if let Ok(value) = serde_json::to_value(&product) {
            self.cache().set(&key, value, CATALOG_CACHE_TTL);
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::positive(Decimal::new(2_999, 2), true)]
    #[case::zero(Decimal::ZERO, false)]
    #[case::negative(Decimal::new(-100, 2), false)]
    #[case::too_precise(Decimal::new(29_999, 3), false)]
    fn test_price_validation(#[case] price: Decimal, #[case] valid: bool) {
        assert_eq!(validate_price(price).is_ok(), valid);
    }

    #[rstest]
    #[case::named("Desk lamp", true)]
    #[case::empty("", false)]
    #[case::whitespace("   ", false)]
    fn test_name_validation(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_name(name).is_ok(), valid);
    }
}
