//! Order receipt types
//!
//! An order is the durable receipt of one purchase attempt that reached a
//! terminal state. Its core fields (amount, product, merchant) are a
//! snapshot taken at purchase time and never change afterwards, even if
//! the product's price changes later.

use super::product::{Product, ProductId};
use super::wallet::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order identifier
pub type OrderId = Uuid;

/// Terminal and transitional states of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created but not yet settled (gateway flows only)
    Pending,

    /// Settled: funds moved and stock decremented
    Completed,

    /// Rejected or reversed
    Failed,
}

/// How the buyer pays for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Settled from the buyer's wallet balance
    Wallet,

    /// Settled through an external payment gateway (not implemented)
    Gateway,
}

/// Durable receipt of one purchase attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    pub id: OrderId,

    /// The purchasing user
    pub buyer_id: UserId,

    /// The purchased product
    pub product_id: ProductId,

    /// The selling merchant, snapshotted from the product
    pub merchant_id: UserId,

    /// How the order was paid
    pub payment_method: PaymentMethod,

    /// Price snapshot at purchase time, two fraction digits
    pub amount: Decimal,

    /// Current status
    pub status: OrderStatus,

    /// Gateway payment reference (gateway flows only)
    pub external_payment_ref: Option<String>,

    /// Additional context; carries at minimum the product name
    pub metadata: serde_json::Value,

    /// When the order was created
    pub created_at: DateTime<Utc>,

    /// When the order was last written
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build the completed-order receipt for a settled wallet purchase
    ///
    /// Called from inside the transfer unit's commit phase; the amount is
    /// the product price captured while the product row lock was held.
    pub(crate) fn completed(buyer_id: UserId, product: &Product, amount: Decimal) -> Self {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            buyer_id,
            product_id: product.id,
            merchant_id: product.merchant_id,
            payment_method: PaymentMethod::Wallet,
            amount,
            status: OrderStatus::Completed,
            external_payment_ref: None,
            metadata: serde_json::json!({ "product_name": product.name }),
            created_at: now,
            updated_at: now,
        }
    }
}
