//! Row storage and the locking contract
//!
//! This module contains the transactional stores the engines operate on:
//! - `row` - Generic per-row exclusive locking (`RowTable` / `RowLock`)
//! - `wallet_store` - Account Store: wallets keyed by owner
//! - `product_store` - Stock Store: product listings with a unit counter
//! - `ledger` - Ledger Writer: append-only balance-change records
//! - `order_store` - Order records and their read projections
//!
//! # The atomic unit
//!
//! An atomic unit is the set of [`RowLock`]s one engine operation holds.
//! While a lock is held, no other locked read or write of that row can
//! proceed. The engines validate everything first, then mutate through
//! the held locks in an infallible commit phase; returning early drops
//! the locks with nothing written, so an aborted unit has no observable
//! side effect.
//!
//! Plain (unlocked) reads exist for listing and query paths only. They
//! may observe slightly stale data and are never used inside the engines.

pub mod ledger;
pub mod order_store;
pub mod product_store;
pub mod row;
pub mod wallet_store;

pub use ledger::Ledger;
pub use order_store::OrderStore;
pub use product_store::ProductStore;
pub use row::{RowLock, StoreConfig};
pub use wallet_store::WalletStore;
