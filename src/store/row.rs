//! Generic per-row exclusive locking
//!
//! `RowTable` keeps each row behind its own mutex inside a concurrent
//! map, so independent rows never contend while operations touching the
//! same row serialize. `RowLock` is the transaction-scoped exclusive
//! lock: it is held for the remainder of the enclosing atomic unit and
//! released when dropped, whether the unit commits or aborts.
//!
//! Lock acquisition is bounded by the store's configured timeout; expiry
//! surfaces as the retryable [`MarketError::LockTimeout`].

use crate::types::MarketError;
use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

/// Store-level configuration shared by all row tables
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a locked read waits for a contended row before the unit
    /// aborts with [`MarketError::LockTimeout`]
    pub lock_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// Transaction-scoped exclusive lock on one row
///
/// Dereferences to the row; mutation through `DerefMut` is how an atomic
/// unit's commit phase writes the row back. Dropping the lock without
/// writing aborts the unit for this row.
pub struct RowLock<V> {
    guard: ArcMutexGuard<RawMutex, V>,
}

impl<V> Deref for RowLock<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.guard
    }
}

impl<V> DerefMut for RowLock<V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.guard
    }
}

/// Concurrent map of rows, each behind its own exclusive lock
///
/// The map itself (dashmap) only guards insertion and id lookup; row
/// content is protected by the per-row mutex so that a unit can hold
/// several rows at once without blocking unrelated traffic.
pub(crate) struct RowTable<K, V> {
    rows: DashMap<K, Arc<Mutex<V>>>,
    lock_timeout: Duration,
    entity: &'static str,
}

impl<K, V> RowTable<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty table for the named entity type
    pub fn new(entity: &'static str, config: &StoreConfig) -> Self {
        RowTable {
            rows: DashMap::new(),
            lock_timeout: config.lock_timeout,
            entity,
        }
    }

    /// Insert a new row
    pub fn insert(&self, key: K, row: V) {
        self.rows.insert(key, Arc::new(Mutex::new(row)));
    }

    /// Take the exclusive, transaction-scoped lock on a row
    ///
    /// Blocks until the row is free or the configured timeout elapses.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(lock))` - The row exists and is now exclusively held
    /// * `Ok(None)` - No row exists for the key
    /// * `Err(MarketError::LockTimeout)` - The row stayed contended past
    ///   the timeout; the enclosing unit must abort
    pub fn locked_read(&self, key: &K) -> Result<Option<RowLock<V>>, MarketError> {
        let row = match self.rows.get(key) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Ok(None),
        };
        // The map shard guard is released here; only the row mutex is
        // held across the unit.
        match row.try_lock_arc_for(self.lock_timeout) {
            Some(guard) => Ok(Some(RowLock { guard })),
            None => {
                tracing::warn!(entity = self.entity, "row lock acquisition timed out");
                Err(MarketError::LockTimeout {
                    entity: self.entity,
                })
            }
        }
    }

    /// Read a point-in-time snapshot of a row without joining any unit
    ///
    /// Listing/query paths only. The snapshot may be stale by the time
    /// the caller looks at it.
    pub fn read(&self, key: &K) -> Option<V> {
        self.rows.get(key).map(|entry| entry.value().lock().clone())
    }

    /// Snapshot every row, for listing paths
    pub fn snapshot(&self) -> Vec<V> {
        self.rows
            .iter()
            .map(|entry| entry.value().lock().clone())
            .collect()
    }
}
