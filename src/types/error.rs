//! Error types for the marketplace engine
//!
//! This module defines all failures the engines can surface. The taxonomy
//! splits into two groups:
//!
//! - **Domain rejections**: deterministic, non-retryable outcomes of a
//!   validation check (`ProductNotFound`, `OutOfStock`,
//!   `InsufficientBalance`, ...). They are reported before any write
//!   occurs and leave no partial mutation behind.
//! - **Infrastructure failures**: `LockTimeout` and `StorageFault`. The
//!   aborted unit has no observable side effect, so callers may safely
//!   retry the whole operation.

use super::order::OrderId;
use super::product::ProductId;
use super::wallet::UserId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the marketplace engine
///
/// Each variant carries enough structured detail for the web layer to
/// render a precise user message without parsing strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    /// No product exists with the given id
    #[error("Product {product} not found")]
    ProductNotFound {
        /// The product id that was looked up
        product: ProductId,
    },

    /// No wallet exists for the given owner
    ///
    /// Reported for the buyer or the merchant depending on which lookup
    /// failed; the `owner` field distinguishes the two.
    #[error("Wallet not found for user {owner}")]
    WalletNotFound {
        /// The wallet owner that was looked up
        owner: UserId,
    },

    /// No order exists with the given id
    #[error("Order {order} not found")]
    OrderNotFound {
        /// The order id that was looked up
        order: OrderId,
    },

    /// The product has no units left in stock
    ///
    /// Reported before any wallet lock is attempted.
    #[error("Product {product} is out of stock")]
    OutOfStock {
        /// The sold-out product
        product: ProductId,
    },

    /// The wallet balance does not cover the requested amount
    ///
    /// The unit aborts with no mutation, including no stock decrement.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the operation needed
        required: Decimal,
        /// Balance actually available
        available: Decimal,
    },

    /// The request violates a domain rule
    ///
    /// Examples: self-purchase, non-positive amount, gateway payment.
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// What rule was violated
        reason: String,
    },

    /// The actor is not authorized to read the resource
    #[error("User {actor} does not have access to {resource}")]
    Forbidden {
        /// The actor who made the request
        actor: UserId,
        /// Description of the resource, e.g. "order <id>"
        resource: String,
    },

    /// A balance computation would overflow the decimal range
    ///
    /// The unit aborts before any mutation.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// A row lock could not be acquired within the store's timeout
    ///
    /// Retryable: the aborted unit left no observable side effect.
    #[error("Timed out waiting for the {entity} row lock")]
    LockTimeout {
        /// Entity type of the contended row
        entity: &'static str,
    },

    /// The underlying store misbehaved (index/row mismatch, broken
    /// ledger chain, ...)
    ///
    /// Retryable from the caller's perspective, though it usually
    /// signals a bug worth paging over.
    #[error("Storage fault: {message}")]
    StorageFault {
        /// Description of the fault
        message: String,
    },
}

impl MarketError {
    /// Whether the caller may retry the whole unit
    ///
    /// True exactly for the infrastructure failures; domain rejections
    /// are deterministic and will fail again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MarketError::LockTimeout { .. } | MarketError::StorageFault { .. }
        )
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(required: Decimal, available: Decimal) -> Self {
        MarketError::InsufficientBalance {
            required,
            available,
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        MarketError::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Create a Forbidden error
    pub fn forbidden(actor: UserId, resource: impl Into<String>) -> Self {
        MarketError::Forbidden {
            actor,
            resource: resource.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        MarketError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create a StorageFault error
    pub fn storage_fault(message: impl Into<String>) -> Self {
        MarketError::StorageFault {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn nil() -> Uuid {
        Uuid::nil()
    }

    #[rstest]
    #[case::product_not_found(
        MarketError::ProductNotFound { product: nil() },
        "Product 00000000-0000-0000-0000-000000000000 not found"
    )]
    #[case::wallet_not_found(
        MarketError::WalletNotFound { owner: nil() },
        "Wallet not found for user 00000000-0000-0000-0000-000000000000"
    )]
    #[case::out_of_stock(
        MarketError::OutOfStock { product: nil() },
        "Product 00000000-0000-0000-0000-000000000000 is out of stock"
    )]
    #[case::insufficient_balance(
        MarketError::insufficient_balance(Decimal::new(3_000, 2), Decimal::new(1_000, 2)),
        "Insufficient balance: required 30.00, available 10.00"
    )]
    #[case::invalid_operation(
        MarketError::invalid_operation("self-purchase"),
        "Invalid operation: self-purchase"
    )]
    #[case::forbidden(
        MarketError::forbidden(nil(), "order 42"),
        "User 00000000-0000-0000-0000-000000000000 does not have access to order 42"
    )]
    #[case::lock_timeout(
        MarketError::LockTimeout { entity: "wallet" },
        "Timed out waiting for the wallet row lock"
    )]
    #[case::storage_fault(
        MarketError::storage_fault("ledger chain broken"),
        "Storage fault: ledger chain broken"
    )]
    fn test_error_display(#[case] error: MarketError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::lock_timeout(MarketError::LockTimeout { entity: "product" }, true)]
    #[case::storage_fault(MarketError::storage_fault("boom"), true)]
    #[case::out_of_stock(MarketError::OutOfStock { product: Uuid::nil() }, false)]
    #[case::insufficient(
        MarketError::insufficient_balance(Decimal::ONE, Decimal::ZERO),
        false
    )]
    #[case::invalid(MarketError::invalid_operation("no"), false)]
    fn test_retryability(#[case] error: MarketError, #[case] retryable: bool) {
        assert_eq!(error.is_retryable(), retryable);
    }
}
