//! Read-through cache collaborator for listing endpoints
//!
//! The engines never read through the cache inside an atomic unit; they
//! only *invalidate* keys after a unit commits, so stale cached stock or
//! balances are never served past a completed mutation. Query paths use
//! the cache read-through with a short TTL.

use crate::types::{ProductId, UserId};
use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Cache keys used by the engine
pub mod keys {
    use super::{ProductId, UserId};

    /// Key for the full product listing
    pub const PRODUCT_LIST: &str = "products:list";

    /// Key for one product
    pub fn product(product_id: &ProductId) -> String {
        format!("products:{product_id}")
    }

    /// Key for one user's wallet snapshot
    pub fn wallet(owner_id: &UserId) -> String {
        format!("wallet:{owner_id}")
    }
}

/// Cache interface the engine consumes
///
/// Implementations must tolerate concurrent calls; the in-process
/// default below is enough for a single node, a shared cache belongs
/// behind the same trait.
pub trait ListingCache: Send + Sync {
    /// Look up a key; `None` is a miss (absent or expired)
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value under a key for at most `ttl`
    fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Drop a key immediately
    fn invalidate(&self, key: &str);
}

struct CacheSlot {
    value: Value,
    expires_at: Instant,
}

/// In-process TTL cache
pub struct InMemoryCache {
    slots: DashMap<String, CacheSlot>,
}

impl InMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        InMemoryCache {
            slots: DashMap::new(),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let slot = self.slots.get(key)?;
        if slot.expires_at <= Instant::now() {
            drop(slot);
            self.slots.remove(key);
            return None;
        }
        Some(slot.value.clone())
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.slots.insert(
            key.to_string(),
            CacheSlot {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn invalidate(&self, key: &str) {
        self.slots.remove(key);
    }
}

/// Cache that never hits; useful in tests and for callers that want the
/// engine without any caching layer
pub struct NoCache;

impl ListingCache for NoCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Duration) {}

    fn invalidate(&self, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_then_get() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!(1)));
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_invalidate_drops_key() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(60));
        cache.invalidate("k");
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_no_cache_never_hits() {
        let cache = NoCache;
        cache.set("k", json!(1), Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_wallet_key_scheme() {
        let owner = uuid::Uuid::nil();
        assert_eq!(
            keys::wallet(&owner),
            "wallet:00000000-0000-0000-0000-000000000000"
        );
    }
}
