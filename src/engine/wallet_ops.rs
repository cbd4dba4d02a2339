//! Deposit/Withdraw Engine and wallet query paths
//!
//! Deposits and withdrawals are single-wallet atomic units sharing the
//! transfer engine's discipline: lock the row, validate everything,
//! apply the balance and append one ledger entry, release the lock.

use super::MarketEngine;
use crate::cache::keys;
use crate::store::ledger::EntryDraft;
use crate::store::{Ledger, RowLock};
use crate::types::{EntryType, LedgerEntry, MarketError, UserId, Wallet, MONEY_DP};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;

/// Result of a settled deposit or withdrawal
#[derive(Debug, Clone, PartialEq)]
pub struct WalletReceipt {
    /// The wallet's balance after the change
    pub new_balance: Decimal,

    /// The ledger entry recording the change
    pub transaction: LedgerEntry,
}

/// How long cached wallet snapshots live
const WALLET_CACHE_TTL: Duration = Duration::from_secs(60);

/// Smallest amount the engine accepts: one cent
fn minimum_amount() -> Decimal {
    Decimal::new(1, MONEY_DP)
}

/// Defensive re-check of a caller-validated amount
///
/// The validation layer already rejects bad requests; the engine still
/// refuses amounts below one cent or carrying more than two fraction
/// digits, since either would corrupt the ledger's fixed-point
/// arithmetic.
fn validate_amount(amount: Decimal) -> Result<(), MarketError> {
    if amount < minimum_amount() {
        return Err(MarketError::invalid_operation(format!(
            "amount must be at least {}",
            minimum_amount()
        )));
    }
    if amount != amount.round_dp(MONEY_DP) {
        return Err(MarketError::invalid_operation(
            "amount carries more than two fraction digits",
        ));
    }
    Ok(())
}

/// One deposit's or withdrawal's atomic unit
struct WalletUnit {
    wallet: RowLock<Wallet>,
    entry_type: EntryType,
    amount: Decimal,
    after: Decimal,
    description: &'static str,
}

impl WalletUnit {
    fn commit(mut self, ledger: &Ledger) -> WalletReceipt {
        let before = self.wallet.balance;
        self.wallet.apply_balance(self.after);
        let transaction = ledger.append(EntryDraft {
            wallet_id: self.wallet.id,
            entry_type: self.entry_type,
            amount: self.amount,
            balance_before: before,
            balance_after: self.after,
            reference_id: None,
            metadata: json!({ "description": self.description }),
        });
        WalletReceipt {
            new_balance: self.after,
            transaction,
        }
    }
}

impl MarketEngine {
    /// Deposit funds into a user's wallet
    ///
    /// # Errors
    ///
    /// * `WalletNotFound` - The owner has no wallet
    /// * `InvalidOperation` - Amount below one cent or too precise
    /// * `ArithmeticOverflow` - The credit would overflow
    /// * `LockTimeout` / `StorageFault` - Retryable infrastructure
    ///   failure; the aborted unit wrote nothing
    pub fn deposit(&self, owner_id: UserId, amount: Decimal) -> Result<WalletReceipt, MarketError> {
        validate_amount(amount)?;

        let wallet = self.wallets().locked_read_by_owner(owner_id)?;
        let after = wallet
            .balance
            .checked_add(amount)
            .ok_or_else(|| MarketError::arithmetic_overflow("deposit"))?;

        let receipt = WalletUnit {
            wallet,
            entry_type: EntryType::Deposit,
            amount,
            after,
            description: "Wallet deposit",
        }
        .commit(self.ledger());

        self.cache().invalidate(&keys::wallet(&owner_id));
        tracing::info!(owner = %owner_id, amount = %amount, "deposit committed");
        Ok(receipt)
    }

    /// Withdraw funds from a user's wallet
    ///
    /// # Errors
    ///
    /// As [`MarketEngine::deposit`], plus `InsufficientBalance` when the
    /// balance does not cover the amount; the unit aborts with no
    /// mutation.
    pub fn withdraw(
        &self,
        owner_id: UserId,
        amount: Decimal,
    ) -> Result<WalletReceipt, MarketError> {
        validate_amount(amount)?;

        let wallet = self.wallets().locked_read_by_owner(owner_id)?;
        if wallet.balance < amount {
            return Err(MarketError::insufficient_balance(amount, wallet.balance));
        }
        let after = wallet
            .balance
            .checked_sub(amount)
            .ok_or_else(|| MarketError::arithmetic_overflow("withdrawal"))?;

        let receipt = WalletUnit {
            wallet,
            entry_type: EntryType::Withdraw,
            amount,
            after,
            description: "Wallet withdrawal",
        }
        .commit(self.ledger());

        self.cache().invalidate(&keys::wallet(&owner_id));
        tracing::info!(owner = %owner_id, amount = %amount, "withdrawal committed");
        Ok(receipt)
    }

    /// Cached read-through snapshot of a user's wallet
    ///
    /// Query path: unlocked, may be up to [`WALLET_CACHE_TTL`] stale,
    /// and never participates in an atomic unit.
    pub fn wallet(&self, owner_id: UserId) -> Result<Wallet, MarketError> {
        let key = keys::wallet(&owner_id);
        if let Some(cached) = self.cache().get(&key) {
            if let Ok(wallet) = serde_json::from_value::<Wallet>(cached) {
                tracing::debug!(owner = %owner_id, "wallet cache hit");
                return Ok(wallet);
            }
            // Undeserializable entries are treated as a miss.
            self.cache().invalidate(&key);
        }

        let wallet = self
            .wallets()
            .read_by_owner(owner_id)
            .ok_or(MarketError::WalletNotFound { owner: owner_id })?;
        if let Ok(value) = serde_json::to_value(&wallet) {
            self.cache().set(&key, value, WALLET_CACHE_TTL);
        }
        Ok(wallet)
    }

    /// A wallet's ledger entries, newest first
    pub fn transactions_for(&self, owner_id: UserId) -> Result<Vec<LedgerEntry>, MarketError> {
        let wallet = self
            .wallets()
            .read_by_owner(owner_id)
            .ok_or(MarketError::WalletNotFound { owner: owner_id })?;
        let mut entries = self.ledger().entries_for(&wallet.id);
        entries.reverse();
        Ok(entries)
    }

    /// Replay a wallet's ledger chain and verify it reconstructs the
    /// stored balance exactly
    ///
    /// # Errors
    ///
    /// * `WalletNotFound` - The owner has no wallet
    /// * `StorageFault` - The chain is broken or does not reproduce the
    ///   stored balance
    pub fn audit_wallet(&self, owner_id: UserId) -> Result<Decimal, MarketError> {
        let wallet = self
            .wallets()
            .read_by_owner(owner_id)
            .ok_or(MarketError::WalletNotFound { owner: owner_id })?;
        let replayed = self.ledger().replay(&wallet.id)?;
        if replayed != wallet.balance {
            return Err(MarketError::storage_fault(format!(
                "ledger replay for wallet {} gives {}, stored balance is {}",
                wallet.id, replayed, wallet.balance
            )));
        }
        Ok(replayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, MONEY_DP)
    }

    #[rstest]
    #[case::one_cent(Decimal::new(1, 2), true)]
    #[case::round_sum(Decimal::new(10_000, 2), true)]
    #[case::zero(Decimal::ZERO, false)]
    #[case::negative(Decimal::new(-100, 2), false)]
    #[case::sub_cent(Decimal::new(5, 3), false)]
    #[case::too_precise(Decimal::new(10_001, 3), false)]
    fn test_amount_validation(#[case] amount: Decimal, #[case] valid: bool) {
        assert_eq!(validate_amount(amount).is_ok(), valid);
    }

    #[test]
    fn test_minimum_amount_is_one_cent() {
        assert_eq!(minimum_amount(), money(1));
    }
}
