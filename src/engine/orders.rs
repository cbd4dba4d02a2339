//! Order Query Surface
//!
//! Thin read-only projections over committed orders. Not part of the
//! correctness-critical path: these never lock rows and never mutate.

use super::MarketEngine;
use crate::types::{AuthenticatedActor, MarketError, Order, OrderId, UserId};

impl MarketEngine {
    /// A buyer's orders, newest first
    pub fn orders_for_buyer(&self, buyer_id: UserId) -> Vec<Order> {
        self.orders().by_buyer(buyer_id)
    }

    /// A merchant's sales, newest first
    pub fn orders_for_merchant(&self, merchant_id: UserId) -> Vec<Order> {
        self.orders().by_merchant(merchant_id)
    }

    /// Fetch one order, visible only to its buyer or its merchant
    ///
    /// # Errors
    ///
    /// * `OrderNotFound` - No order with this id
    /// * `Forbidden` - The actor is neither the buyer nor the merchant
    pub fn order(
        &self,
        order_id: OrderId,
        actor: &AuthenticatedActor,
    ) -> Result<Order, MarketError> {
        let order = self
            .orders()
            .get(&order_id)
            .ok_or(MarketError::OrderNotFound { order: order_id })?;
        if order.buyer_id != actor.id && order.merchant_id != actor.id {
            return Err(MarketError::forbidden(
                actor.id,
                format!("order {order_id}"),
            ));
        }
        Ok(order)
    }
}
