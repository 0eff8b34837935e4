//! Time-bounded cache of policy evaluator outcomes.
//!
//! Keys are content hashes from `canonical::content_hash`. Only definitive
//! outcomes are cached; evaluator failures never are, so a recovered
//! evaluator is consulted again on the next call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use praetor_contracts::policy::PolicyOutcome;

#[derive(Debug, Clone)]
struct CachedOutcome {
    outcome: PolicyOutcome,
    stored_at: Instant,
}

/// Hit/miss counters for a `DecisionCache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct DecisionCache {
    entries: DashMap<String, CachedOutcome>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DecisionCache {
    /// A zero `ttl` or zero `max_entries` disables caching.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    /// Look up a live entry. Expired entries are removed on the way.
    pub fn get(&self, key: &str) -> Option<PolicyOutcome> {
        let hit = self
            .entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.outcome.clone());

        match hit {
            Some(outcome) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(outcome)
            }
            None => {
                self.entries
                    .remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store an outcome. When the cache is full, expired entries are purged
    /// first; if it is still full the new entry is not stored.
    pub fn insert(&self, key: String, outcome: PolicyOutcome) {
        if !self.is_enabled() {
            return;
        }

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            let purged = self.purge_expired();
            if self.entries.len() >= self.max_entries {
                debug!(
                    purged,
                    max_entries = self.max_entries,
                    "policy decision cache full; outcome not cached"
                );
                return;
            }
        }

        self.entries.insert(
            key,
            CachedOutcome {
                outcome,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn hit_within_ttl() {
        let cache = DecisionCache::new(Duration::from_secs(60), 16);
        cache.insert("k".to_string(), PolicyOutcome::allow());

        assert_eq!(cache.get("k"), Some(PolicyOutcome::allow()));
        assert_eq!(cache.get("other"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = DecisionCache::new(Duration::from_millis(10), 16);
        cache.insert("k".to_string(), PolicyOutcome::deny("no"));

        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().entries, 0, "expired entry removed on lookup");
    }

    #[test]
    fn full_cache_does_not_grow() {
        let cache = DecisionCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), PolicyOutcome::allow());
        cache.insert("b".to_string(), PolicyOutcome::allow());
        cache.insert("c".to_string(), PolicyOutcome::allow());

        assert_eq!(cache.stats().entries, 2);
        assert_eq!(cache.get("c"), None);
    }

    #[test]
    fn full_cache_makes_room_from_expired_entries() {
        let cache = DecisionCache::new(Duration::from_millis(10), 1);
        cache.insert("a".to_string(), PolicyOutcome::allow());
        thread::sleep(Duration::from_millis(30));

        cache.insert("b".to_string(), PolicyOutcome::allow());
        assert_eq!(cache.get("b"), Some(PolicyOutcome::allow()));
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = DecisionCache::new(Duration::ZERO, 16);
        cache.insert("k".to_string(), PolicyOutcome::allow());
        assert!(!cache.is_enabled());
        assert_eq!(cache.get("k"), None);
    }
}
