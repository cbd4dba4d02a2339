//! Account Store: wallets keyed by owner
//!
//! Wallets are created once per user at signup time and afterwards
//! mutated only by the engines, through locked reads. The owner index is
//! the canonical lookup path: every engine operation resolves a wallet
//! by its owner id, never by wallet id supplied from outside.

use super::row::{RowLock, RowTable, StoreConfig};
use crate::types::{MarketError, UserId, Wallet, WalletId};
use dashmap::DashMap;

/// Holds all wallet rows and the owner → wallet index
pub struct WalletStore {
    rows: RowTable<WalletId, Wallet>,
    by_owner: DashMap<UserId, WalletId>,
}

impl WalletStore {
    /// Create an empty store
    pub fn new(config: &StoreConfig) -> Self {
        WalletStore {
            rows: RowTable::new("wallet", config),
            by_owner: DashMap::new(),
        }
    }

    /// Create the wallet for a newly signed-up user
    ///
    /// The wallet starts at a zero balance; its first ledger entry will
    /// chain off zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the owner already has a wallet;
    /// the wallet/user relationship is one-to-one.
    pub fn create(&self, owner_id: UserId) -> Result<Wallet, MarketError> {
        let wallet = Wallet::new(owner_id);
        let mut claimed = false;
        self.by_owner.entry(owner_id).or_insert_with(|| {
            claimed = true;
            wallet.id
        });
        if !claimed {
            return Err(MarketError::invalid_operation(format!(
                "user {owner_id} already has a wallet"
            )));
        }
        self.rows.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    /// Take the exclusive lock on a user's wallet row
    ///
    /// # Errors
    ///
    /// * `WalletNotFound` - The owner has no wallet
    /// * `LockTimeout` - The row stayed contended past the store timeout
    /// * `StorageFault` - The owner index points at a missing row
    pub fn locked_read_by_owner(&self, owner_id: UserId) -> Result<RowLock<Wallet>, MarketError> {
        let wallet_id = self
            .wallet_id_for(owner_id)
            .ok_or(MarketError::WalletNotFound { owner: owner_id })?;
        self.rows.locked_read(&wallet_id)?.ok_or_else(|| {
            MarketError::storage_fault(format!(
                "owner index references missing wallet row {wallet_id}"
            ))
        })
    }

    /// Unlocked snapshot of a user's wallet, for query paths only
    pub fn read_by_owner(&self, owner_id: UserId) -> Option<Wallet> {
        let wallet_id = self.wallet_id_for(owner_id)?;
        self.rows.read(&wallet_id)
    }

    fn wallet_id_for(&self, owner_id: UserId) -> Option<WalletId> {
        self.by_owner.get(&owner_id).map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_create_then_read_by_owner() {
        let store = WalletStore::new(&StoreConfig::default());
        let owner = Uuid::new_v4();

        let created = store.create(owner).unwrap();
        let read = store.read_by_owner(owner).unwrap();

        assert_eq!(read, created);
    }

    #[test]
    fn test_second_wallet_for_same_owner_is_rejected() {
        let store = WalletStore::new(&StoreConfig::default());
        let owner = Uuid::new_v4();
        store.create(owner).unwrap();

        let result = store.create(owner);

        assert!(matches!(
            result,
            Err(MarketError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_locked_read_for_unknown_owner() {
        let store = WalletStore::new(&StoreConfig::default());
        let owner = Uuid::new_v4();

        let result = store.locked_read_by_owner(owner);

        assert_eq!(
            result.err(),
            Some(MarketError::WalletNotFound { owner })
        );
    }
}
