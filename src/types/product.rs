//! Product listing types

use super::wallet::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product identifier
pub type ProductId = Uuid;

/// A merchant's product listing with finite stock
///
/// Created by a merchant and mutated only by that merchant's own edits
/// and by the transfer engine's stock decrement. `available_units` never
/// goes negative; the transfer engine refuses to sell past zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// The merchant who owns this listing
    pub merchant_id: UserId,

    /// Display name
    pub name: String,

    /// Unit price, two fraction digits, strictly positive
    pub price: Decimal,

    /// Units remaining in stock
    pub available_units: u32,

    /// Write counter, incremented on every committed mutation
    pub version: u64,

    /// When the listing was created
    pub created_at: DateTime<Utc>,

    /// When the listing was last written
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new listing for the given merchant
    pub fn new(merchant_id: UserId, name: String, price: Decimal, available_units: u32) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            merchant_id,
            name,
            price,
            available_units,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Consume one unit of stock
    ///
    /// Only the transfer engine calls this, inside an atomic unit while
    /// the product row lock is held and after the stock check passed.
    pub(crate) fn take_unit(&mut self) {
        debug_assert!(self.available_units >= 1, "stock check must precede take_unit");
        self.available_units -= 1;
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Stamp a committed merchant edit
    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MONEY_DP;

    #[test]
    fn test_take_unit_decrements_stock_and_bumps_version() {
        let mut product = Product::new(
            Uuid::new_v4(),
            "Desk lamp".to_string(),
            Decimal::new(2_999, MONEY_DP),
            3,
        );

        product.take_unit();

        assert_eq!(product.available_units, 2);
        assert_eq!(product.version, 1);
    }
}
