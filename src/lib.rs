//! Marketplace Ledger Engine
//!
//! # Overview
//!
//! This library is the money-movement and stock-reservation core of a
//! ledger-backed marketplace: users hold wallets with a monetary
//! balance, merchants list products with finite stock, and buyers spend
//! wallet balance to purchase products, producing an order and a paired
//! set of audit-grade ledger entries.
//!
//! The web layer (routing, authentication, DTO validation) lives
//! outside this crate; it hands the engine verified actor identities and
//! well-typed requests, and consumes back structured results or typed
//! errors.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Wallet, Product, Order, LedgerEntry, errors)
//! - [`store`] - Row storage and the per-row exclusive locking contract:
//!   - [`store::wallet_store`] - Account Store
//!   - [`store::product_store`] - Stock Store
//!   - [`store::ledger`] - Ledger Writer (append-only, reconstructable)
//!   - [`store::order_store`] - Order records
//! - [`engine`] - The engines:
//!   - [`engine::transfer`] - Transfer Engine: the atomic purchase flow
//!   - [`engine::wallet_ops`] - Deposit/Withdraw Engine
//!   - [`engine::orders`] - Order Query Surface
//!   - [`engine::catalog`] - Merchant listing management
//! - [`cache`] - Read-through cache collaborator for listing endpoints
//!
//! # Guarantees
//!
//! Every balance or stock mutation happens inside one atomic unit: a set
//! of per-row exclusive locks acquired in a fixed global order
//! (Product → Buyer Wallet → Merchant Wallet), validated completely
//! before the first write, committed as one, or aborted with no
//! observable side effect. Under arbitrary concurrent requests this
//! rules out lost updates, double-spends and overselling, and every
//! balance change stays provable from its ledger entry's before/after
//! snapshot.

pub mod cache;
pub mod engine;
pub mod store;
pub mod types;

pub use cache::{InMemoryCache, ListingCache, NoCache};
pub use engine::{MarketEngine, ProductUpdate, PurchaseReceipt, WalletReceipt};
pub use store::{Ledger, OrderStore, ProductStore, RowLock, StoreConfig, WalletStore};
pub use types::{
    AuthenticatedActor, EntryType, LedgerEntry, MarketError, Order, OrderId, OrderStatus,
    PaymentMethod, Product, ProductId, Role, UserId, Wallet, WalletId,
};
