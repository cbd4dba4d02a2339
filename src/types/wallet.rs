//! Wallet and ledger-entry types
//!
//! This module defines the per-user monetary account (Wallet) and the
//! immutable ledger entries that record every balance change with a
//! before/after snapshot.

use super::order::OrderId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identifier (assigned by the user/auth collaborator at signup)
pub type UserId = Uuid;

/// Wallet identifier
pub type WalletId = Uuid;

/// Ledger entry identifier
pub type EntryId = Uuid;

/// Number of fraction digits carried by persisted monetary amounts
pub const MONEY_DP: u32 = 2;

/// Per-user monetary account
///
/// One wallet exists per user, created with a zero balance when the user
/// signs up. The balance is mutated only by the transfer and
/// deposit/withdraw engines, never by direct field assignment elsewhere,
/// and never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet identifier
    pub id: WalletId,

    /// The owning user (unique: one wallet per user)
    pub owner_id: UserId,

    /// Current balance, two fraction digits, never negative
    pub balance: Decimal,

    /// Write counter, incremented on every committed balance change
    ///
    /// Diagnostic token only; concurrency control is the pessimistic
    /// row lock, not this counter.
    pub version: u64,

    /// When the wallet was created
    pub created_at: DateTime<Utc>,

    /// When the wallet was last written
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet for the given owner with a zero balance
    pub fn new(owner_id: UserId) -> Self {
        let now = Utc::now();
        Wallet {
            id: Uuid::new_v4(),
            owner_id,
            balance: Decimal::ZERO,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a committed balance, bumping the version and updated-at stamp
    ///
    /// Only the engines call this, from inside an atomic unit while the
    /// wallet row lock is held.
    pub(crate) fn apply_balance(&mut self, new_balance: Decimal) {
        self.balance = new_balance;
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Ledger entry types
///
/// Amounts are stored unsigned; the type determines the direction of the
/// balance change. Deposit and Earning credit the wallet, Withdraw and
/// Purchase debit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Funds added to a wallet from outside the marketplace
    Deposit,

    /// Funds removed from a wallet to outside the marketplace
    Withdraw,

    /// Buyer-side debit of a completed purchase
    Purchase,

    /// Merchant-side credit of a completed purchase
    Earning,
}

impl EntryType {
    /// Whether this entry type credits (increases) the wallet balance
    pub fn is_credit(self) -> bool {
        matches!(self, EntryType::Deposit | EntryType::Earning)
    }
}

/// Immutable record of one wallet balance change
///
/// Entries are append-only: once written they are never mutated or
/// deleted. For any wallet, replaying its entries in sequence order
/// reconstructs the current balance exactly: `balance_before` of the
/// first entry is the creation balance (zero) and every subsequent
/// entry chains off the previous `balance_after`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry identifier
    pub id: EntryId,

    /// The wallet whose balance changed
    pub wallet_id: WalletId,

    /// Direction-by-convention type of the change
    pub entry_type: EntryType,

    /// Unsigned amount of the change, two fraction digits
    pub amount: Decimal,

    /// Balance immediately before the change
    pub balance_before: Decimal,

    /// Balance immediately after the change
    pub balance_after: Decimal,

    /// The order this entry settles, for purchase/earning entries
    pub reference_id: Option<OrderId>,

    /// Additional context (order id, product name, buyer id, ...)
    pub metadata: serde_json::Value,

    /// Global append counter; totally orders entries even when
    /// timestamps collide
    pub sequence: u64,

    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Check the entry's internal balance invariant
    ///
    /// `balance_after` must equal `balance_before` plus the amount for
    /// credit types and minus the amount for debit types.
    pub fn is_balanced(&self) -> bool {
        let expected = if self.entry_type.is_credit() {
            self.balance_before.checked_add(self.amount)
        } else {
            self.balance_before.checked_sub(self.amount)
        };
        expected == Some(self.balance_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, MONEY_DP)
    }

    fn entry(entry_type: EntryType, amount: i64, before: i64, after: i64) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            entry_type,
            amount: money(amount),
            balance_before: money(before),
            balance_after: money(after),
            reference_id: None,
            metadata: serde_json::Value::Null,
            sequence: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_wallet_starts_at_zero() {
        let owner = Uuid::new_v4();
        let wallet = Wallet::new(owner);

        assert_eq!(wallet.owner_id, owner);
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.version, 0);
    }

    #[test]
    fn test_apply_balance_bumps_version() {
        let mut wallet = Wallet::new(Uuid::new_v4());

        wallet.apply_balance(money(10_000));

        assert_eq!(wallet.balance, money(10_000));
        assert_eq!(wallet.version, 1);
    }

    #[rstest]
    #[case::deposit(EntryType::Deposit, true)]
    #[case::withdraw(EntryType::Withdraw, false)]
    #[case::purchase(EntryType::Purchase, false)]
    #[case::earning(EntryType::Earning, true)]
    fn test_entry_type_direction(#[case] entry_type: EntryType, #[case] credit: bool) {
        assert_eq!(entry_type.is_credit(), credit);
    }

    #[rstest]
    #[case::credit_balanced(entry(EntryType::Deposit, 3_000, 10_000, 13_000), true)]
    #[case::debit_balanced(entry(EntryType::Purchase, 3_000, 10_000, 7_000), true)]
    #[case::credit_off_by_one(entry(EntryType::Earning, 3_000, 10_000, 13_001), false)]
    #[case::debit_wrong_direction(entry(EntryType::Withdraw, 3_000, 10_000, 13_000), false)]
    fn test_entry_balance_invariant(#[case] entry: LedgerEntry, #[case] balanced: bool) {
        assert_eq!(entry.is_balanced(), balanced);
    }
}
