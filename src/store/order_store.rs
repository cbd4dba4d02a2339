//! Order records and their read projections
//!
//! Orders are written once, at the commit of a purchase unit, and read
//! through simple projections over committed data. The projections sit
//! outside the correctness-critical path.

use crate::types::{Order, OrderId, UserId};
use dashmap::DashMap;

/// Holds all order records
pub struct OrderStore {
    rows: DashMap<OrderId, Order>,
}

impl OrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        OrderStore {
            rows: DashMap::new(),
        }
    }

    /// Insert the receipt of a settled purchase
    pub(crate) fn insert(&self, order: Order) {
        self.rows.insert(order.id, order);
    }

    /// Fetch one order
    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.rows.get(order_id).map(|entry| entry.value().clone())
    }

    /// A buyer's orders, newest first
    pub fn by_buyer(&self, buyer_id: UserId) -> Vec<Order> {
        self.collect(|order| order.buyer_id == buyer_id)
    }

    /// A merchant's sales, newest first
    pub fn by_merchant(&self, merchant_id: UserId) -> Vec<Order> {
        self.collect(|order| order.merchant_id == merchant_id)
    }

    fn collect(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .rows
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        orders
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}
