//! Transfer Engine: the atomic purchase flow
//!
//! A purchase moves funds from the buyer's wallet to the merchant's,
//! decrements the product's stock, writes the order receipt and appends
//! the buyer/merchant ledger entry pair, all as one indivisible unit or
//! none of it.
//!
//! # Lock ordering
//!
//! Rows are always locked Product → Buyer Wallet → Merchant Wallet, in
//! this fixed global order regardless of argument order. Two concurrent
//! purchases of the same product serialize on the product lock; the
//! second observes the first's committed stock decrement. Purchases
//! touching disjoint rows run fully in parallel.
//!
//! # Fail-fast validation
//!
//! Every check (product existence, stock, buyer wallet, balance,
//! self-purchase, merchant wallet, checked arithmetic) completes before
//! the first mutation. The commit phase that follows is infallible, so
//! an error return always means nothing was written.

use super::MarketEngine;
use crate::cache::keys;
use crate::store::ledger::EntryDraft;
use crate::store::{Ledger, OrderStore, RowLock};
use crate::types::{
    EntryType, MarketError, Order, PaymentMethod, Product, ProductId, UserId, Wallet,
};
use rust_decimal::Decimal;
use serde_json::json;

/// Result of a settled purchase
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseReceipt {
    /// The completed order
    pub order: Order,

    /// The buyer's balance after the debit
    pub new_balance: Decimal,
}

/// One purchase's atomic unit: the three locked rows plus the validated
/// amounts to apply to them
///
/// Constructing the unit is the fallible half of a purchase; committing
/// it is infallible. Dropping the unit without committing aborts the
/// purchase with no observable side effect.
struct TransferUnit {
    product: RowLock<Product>,
    buyer: RowLock<Wallet>,
    merchant: RowLock<Wallet>,
    price: Decimal,
    buyer_after: Decimal,
    merchant_after: Decimal,
}

impl TransferUnit {
    /// Apply the debit/credit/decrement, write the order and the ledger
    /// entry pair, then release the three row locks
    fn commit(mut self, buyer_id: UserId, ledger: &Ledger, orders: &OrderStore) -> PurchaseReceipt {
        let buyer_before = self.buyer.balance;
        let merchant_before = self.merchant.balance;

        self.buyer.apply_balance(self.buyer_after);
        self.merchant.apply_balance(self.merchant_after);
        self.product.take_unit();

        let order = Order::completed(buyer_id, &self.product, self.price);
        orders.insert(order.clone());

        ledger.append(EntryDraft {
            wallet_id: self.buyer.id,
            entry_type: EntryType::Purchase,
            amount: self.price,
            balance_before: buyer_before,
            balance_after: self.buyer_after,
            reference_id: Some(order.id),
            metadata: json!({
                "order_id": order.id,
                "product_id": self.product.id,
                "product_name": self.product.name,
            }),
        });
        ledger.append(EntryDraft {
            wallet_id: self.merchant.id,
            entry_type: EntryType::Earning,
            amount: self.price,
            balance_before: merchant_before,
            balance_after: self.merchant_after,
            reference_id: Some(order.id),
            metadata: json!({
                "order_id": order.id,
                "product_id": self.product.id,
                "product_name": self.product.name,
                "buyer_id": buyer_id,
            }),
        });

        PurchaseReceipt {
            order,
            new_balance: self.buyer_after,
        }
        // The three RowLocks drop here; the unit is committed before any
        // other locked read can observe the rows.
    }
}

impl MarketEngine {
    /// Purchase one unit of a product with the buyer's wallet balance
    ///
    /// Executes the full atomic purchase unit described in the module
    /// docs and returns the completed order together with the buyer's
    /// new balance.
    ///
    /// # Errors
    ///
    /// Domain rejections, all reported before any write:
    /// * `ProductNotFound` - No product with this id
    /// * `OutOfStock` - No units left (checked before any wallet lock)
    /// * `WalletNotFound` - Buyer or merchant has no wallet
    /// * `InsufficientBalance` - Buyer cannot cover the price
    /// * `InvalidOperation` - Buyer and merchant wallets are the same
    ///   row (self-purchase)
    /// * `ArithmeticOverflow` - The credit would overflow the decimal
    ///   range
    ///
    /// Infrastructure failures (`LockTimeout`, `StorageFault`) abort the
    /// unit the same way and may be retried by the caller.
    pub fn purchase(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
    ) -> Result<PurchaseReceipt, MarketError> {
        // Lock 1: the product row, held through commit so stock can
        // never be oversold.
        let product = self
            .products()
            .locked_read(&product_id)?
            .ok_or(MarketError::ProductNotFound {
                product: product_id,
            })?;

        if product.available_units < 1 {
            return Err(MarketError::OutOfStock {
                product: product_id,
            });
        }

        // Lock 2: the buyer's wallet.
        let buyer = self.wallets().locked_read_by_owner(buyer_id)?;

        let price = product.price;
        if buyer.balance < price {
            return Err(MarketError::insufficient_balance(price, buyer.balance));
        }

        // One wallet per owner: buying from yourself would be a second
        // acquisition of the row we already hold.
        if buyer_id == product.merchant_id {
            return Err(MarketError::invalid_operation(
                "buyer and merchant wallets resolve to the same row (self-purchase)",
            ));
        }

        // Lock 3: the merchant's wallet.
        let merchant = self.wallets().locked_read_by_owner(product.merchant_id)?;

        let buyer_after = buyer
            .balance
            .checked_sub(price)
            .ok_or_else(|| MarketError::arithmetic_overflow("purchase debit"))?;
        let merchant_after = merchant
            .balance
            .checked_add(price)
            .ok_or_else(|| MarketError::arithmetic_overflow("purchase credit"))?;

        let unit = TransferUnit {
            product,
            buyer,
            merchant,
            price,
            buyer_after,
            merchant_after,
        };
        let receipt = unit.commit(buyer_id, self.ledger(), self.orders());

        // Post-commit: drop cached views that now show stale stock or
        // balances.
        self.cache().invalidate(keys::PRODUCT_LIST);
        self.cache().invalidate(&keys::product(&product_id));
        self.cache().invalidate(&keys::wallet(&buyer_id));
        self.cache().invalidate(&keys::wallet(&receipt.order.merchant_id));

        tracing::info!(
            order = %receipt.order.id,
            buyer = %buyer_id,
            product = %product_id,
            amount = %receipt.order.amount,
            "purchase committed"
        );
        Ok(receipt)
    }

    /// Create an order with an explicit payment method
    ///
    /// Wallet payments run the atomic purchase unit; gateway payments
    /// are rejected until a gateway integration exists.
    pub fn create_order(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        payment_method: PaymentMethod,
    ) -> Result<PurchaseReceipt, MarketError> {
        match payment_method {
            PaymentMethod::Wallet => self.purchase(buyer_id, product_id),
            PaymentMethod::Gateway => Err(MarketError::invalid_operation(
                "gateway payment is not implemented",
            )),
        }
    }
}
