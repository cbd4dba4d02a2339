//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `wallet`: Wallet and ledger-entry types
//! - `product`: Product listing types
//! - `order`: Order receipt types
//! - `actor`: Authenticated-actor identity supplied by the auth collaborator
//! - `error`: Error types for the marketplace engine

pub mod actor;
pub mod error;
pub mod order;
pub mod product;
pub mod wallet;

pub use actor::{AuthenticatedActor, Role};
pub use error::MarketError;
pub use order::{Order, OrderId, OrderStatus, PaymentMethod};
pub use product::{Product, ProductId};
pub use wallet::{EntryId, EntryType, LedgerEntry, UserId, Wallet, WalletId, MONEY_DP};
