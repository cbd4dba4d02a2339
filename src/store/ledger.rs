//! Ledger Writer: append-only balance-change records
//!
//! Every committed balance mutation appends exactly one entry capturing
//! the balance before and after the change. Entries are never mutated or
//! deleted, so any wallet's current balance is provable by replaying its
//! entries from zero.

use crate::types::{LedgerEntry, MarketError, WalletId};
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Everything an engine knows about an entry before the ledger assigns
/// its identity, sequence number and timestamp
pub(crate) struct EntryDraft {
    pub wallet_id: WalletId,
    pub entry_type: crate::types::EntryType,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub reference_id: Option<crate::types::OrderId>,
    pub metadata: serde_json::Value,
}

/// Append-only store of ledger entries, grouped per wallet
pub struct Ledger {
    entries: DashMap<WalletId, Vec<LedgerEntry>>,
    sequence: AtomicU64,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger {
            entries: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Append one entry, assigning its id, sequence and timestamp
    ///
    /// Infallible by design: the engines call this inside the commit
    /// phase of an atomic unit, after all validation has passed.
    pub(crate) fn append(&self, draft: EntryDraft) -> LedgerEntry {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            wallet_id: draft.wallet_id,
            entry_type: draft.entry_type,
            amount: draft.amount,
            balance_before: draft.balance_before,
            balance_after: draft.balance_after,
            reference_id: draft.reference_id,
            metadata: draft.metadata,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            created_at: Utc::now(),
        };
        debug_assert!(entry.is_balanced());
        self.entries
            .entry(draft.wallet_id)
            .or_insert_with(Vec::new)
            .push(entry.clone());
        entry
    }

    /// All entries for a wallet in append order
    pub fn entries_for(&self, wallet_id: &WalletId) -> Vec<LedgerEntry> {
        self.entries
            .get(wallet_id)
            .map(|chain| chain.value().clone())
            .unwrap_or_default()
    }

    /// Replay a wallet's chain from zero and return the reconstructed
    /// balance
    ///
    /// Verifies the chain while replaying: the first entry must start at
    /// zero, every entry must satisfy its own before/after invariant,
    /// and every `balance_before` must equal the previous entry's
    /// `balance_after`.
    ///
    /// # Errors
    ///
    /// Returns `StorageFault` describing the first break in the chain.
    pub fn replay(&self, wallet_id: &WalletId) -> Result<Decimal, MarketError> {
        let mut balance = Decimal::ZERO;
        for entry in self.entries_for(wallet_id) {
            if entry.balance_before != balance {
                return Err(MarketError::storage_fault(format!(
                    "ledger chain broken at entry {}: balance_before {} != running balance {}",
                    entry.id, entry.balance_before, balance
                )));
            }
            if !entry.is_balanced() {
                return Err(MarketError::storage_fault(format!(
                    "ledger entry {} violates its balance invariant",
                    entry.id
                )));
            }
            balance = entry.balance_after;
        }
        Ok(balance)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryType;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn draft(
        wallet_id: WalletId,
        entry_type: EntryType,
        amount: i64,
        before: i64,
        after: i64,
    ) -> EntryDraft {
        EntryDraft {
            wallet_id,
            entry_type,
            amount: money(amount),
            balance_before: money(before),
            balance_after: money(after),
            reference_id: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_replay_reconstructs_balance() {
        let ledger = Ledger::new();
        let wallet = Uuid::new_v4();

        ledger.append(draft(wallet, EntryType::Deposit, 10_000, 0, 10_000));
        ledger.append(draft(wallet, EntryType::Purchase, 3_000, 10_000, 7_000));
        ledger.append(draft(wallet, EntryType::Withdraw, 2_000, 7_000, 5_000));

        assert_eq!(ledger.replay(&wallet).unwrap(), money(5_000));
    }

    #[test]
    fn test_replay_of_empty_chain_is_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.replay(&Uuid::new_v4()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_replay_detects_broken_chain() {
        let ledger = Ledger::new();
        let wallet = Uuid::new_v4();

        ledger.append(draft(wallet, EntryType::Deposit, 10_000, 0, 10_000));
        // balance_before does not chain off the previous entry
        ledger.append(draft(wallet, EntryType::Deposit, 1_000, 5_000, 6_000));

        let result = ledger.replay(&wallet);

        assert!(matches!(result, Err(MarketError::StorageFault { .. })));
    }

    #[test]
    fn test_sequence_is_monotonic_across_wallets() {
        let ledger = Ledger::new();
        let a = ledger.append(draft(Uuid::new_v4(), EntryType::Deposit, 100, 0, 100));
        let b = ledger.append(draft(Uuid::new_v4(), EntryType::Deposit, 100, 0, 100));

        assert!(b.sequence > a.sequence);
    }
}
