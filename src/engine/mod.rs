//! The engines
//!
//! This module contains the operations that move money and stock:
//! - `transfer` - Transfer Engine: the atomic purchase flow
//! - `wallet_ops` - Deposit/Withdraw Engine and wallet query paths
//! - `orders` - Order Query Surface
//! - `catalog` - merchant listing management and cached catalog reads
//!
//! All operations hang off [`MarketEngine`], which aggregates the stores
//! and the cache collaborator. The engine holds no other state and does
//! no background work; it can be cloned cheaply and shared across
//! request-handling threads, with all coordination delegated to the
//! stores' row locks.

pub mod catalog;
pub mod orders;
pub mod transfer;
pub mod wallet_ops;

pub use catalog::ProductUpdate;
pub use transfer::PurchaseReceipt;
pub use wallet_ops::WalletReceipt;

use crate::cache::{InMemoryCache, ListingCache};
use crate::store::{Ledger, OrderStore, ProductStore, StoreConfig, WalletStore};
use std::sync::Arc;

/// The marketplace engine: stores plus the cache collaborator
///
/// Constructed once at startup and shared (via `Clone`) with every
/// request handler. Wallet and product rows are the only shared mutable
/// resources; every mutation to them happens inside one atomic unit.
#[derive(Clone)]
pub struct MarketEngine {
    wallets: Arc<WalletStore>,
    products: Arc<ProductStore>,
    ledger: Arc<Ledger>,
    orders: Arc<OrderStore>,
    cache: Arc<dyn ListingCache>,
}

impl MarketEngine {
    /// Assemble an engine from pre-built stores and a cache
    pub fn new(
        wallets: Arc<WalletStore>,
        products: Arc<ProductStore>,
        ledger: Arc<Ledger>,
        orders: Arc<OrderStore>,
        cache: Arc<dyn ListingCache>,
    ) -> Self {
        MarketEngine {
            wallets,
            products,
            ledger,
            orders,
            cache,
        }
    }

    /// Build an engine with fresh stores and the in-process cache
    pub fn with_config(config: &StoreConfig) -> Self {
        MarketEngine::new(
            Arc::new(WalletStore::new(config)),
            Arc::new(ProductStore::new(config)),
            Arc::new(Ledger::new()),
            Arc::new(OrderStore::new()),
            Arc::new(InMemoryCache::new()),
        )
    }

    /// The account store
    pub fn wallets(&self) -> &WalletStore {
        &self.wallets
    }

    /// The stock store
    pub fn products(&self) -> &ProductStore {
        &self.products
    }

    /// The ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The order store
    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    pub(crate) fn cache(&self) -> &dyn ListingCache {
        self.cache.as_ref()
    }
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self::with_config(&StoreConfig::default())
    }
}
