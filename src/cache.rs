//! Result cache / request coordinator.
//!
//! A process-wide store keyed by a caller-supplied key sequence. Reads go
//! through [`QueryCache::fetch`]: a fresh cached value returns immediately,
//! otherwise the supplied fetch future runs — at most once per key at a
//! time, with concurrent callers joining the same in-flight fetch and
//! observing the same result. A failed fetch is never retried automatically
//! and never cached.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use serde_json::Value;

use crate::error::ClientError;

/// A failed read is never automatically retried. Fixed off by contract.
pub const RETRY_ON_FAILURE: bool = false;

/// Reads are never re-triggered by the UI regaining focus. Fixed off by
/// contract.
pub const REFETCH_ON_FOCUS: bool = false;

/// Default staleness window for cached reads.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60);

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Ordered key sequence identifying one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this key begins with every segment of `prefix`, in order.
    pub fn starts_with(&self, prefix: &CacheKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

/// Tunable cache policy. The retry and focus-refetch behaviors are not
/// tunable; see [`RETRY_ON_FAILURE`] and [`REFETCH_ON_FOCUS`].
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Age after which a cached read is considered stale and eligible for
    /// re-fetch on next access.
    pub stale_after: Duration,
    /// Maximum number of cached entries; least-recently-used entries are
    /// evicted beyond it.
    pub capacity: NonZeroUsize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ClientError>>>;

enum Slot {
    Ready { value: Value, fetched_at: Instant },
    InFlight { fetch: SharedFetch, generation: u64 },
}

struct CacheState {
    slots: LruCache<CacheKey, Slot>,
    next_generation: u64,
}

/// Keyed read-through cache with in-flight request deduplication.
pub struct QueryCache {
    policy: CachePolicy,
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        let slots = LruCache::new(policy.capacity);
        Self {
            policy,
            state: Mutex::new(CacheState {
                slots,
                next_generation: 0,
            }),
        }
    }

    /// Read-through fetch: return the cached value when fresh, otherwise run
    /// `fetcher` (joining an already in-flight fetch for the same key if one
    /// exists) and cache the successful result.
    pub async fn fetch<F>(&self, key: CacheKey, fetcher: F) -> Result<Value, ClientError>
    where
        F: Future<Output = Result<Value, ClientError>> + Send + 'static,
    {
        let (fetch, generation) = {
            let mut state = self.lock();
            match state.slots.get(&key) {
                Some(Slot::Ready { value, fetched_at })
                    if fetched_at.elapsed() < self.policy.stale_after =>
                {
                    return Ok(value.clone());
                }
                Some(Slot::InFlight { fetch, generation }) => (fetch.clone(), *generation),
                _ => {
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    let fetch: SharedFetch = fetcher.boxed().shared();
                    state.slots.put(
                        key.clone(),
                        Slot::InFlight {
                            fetch: fetch.clone(),
                            generation,
                        },
                    );
                    (fetch, generation)
                }
            }
        };

        let result = fetch.await;

        // Only the cohort that installed this in-flight slot may settle it;
        // a newer fetch started after an invalidation wins over a late one.
        let mut state = self.lock();
        let settled_by_us = matches!(
            state.slots.peek(&key),
            Some(Slot::InFlight { generation: current, .. }) if *current == generation
        );
        if settled_by_us {
            match &result {
                Ok(value) => {
                    state.slots.put(
                        key,
                        Slot::Ready {
                            value: value.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Err(_) => {
                    state.slots.pop(&key);
                }
            }
        }
        result
    }

    /// Drop the entry for `key`; the next read bypasses the cache regardless
    /// of the staleness window.
    pub fn invalidate(&self, key: &CacheKey) {
        self.lock().slots.pop(key);
    }

    /// Drop every entry whose key starts with `prefix`. Used after a
    /// successful write that affects previously cached reads.
    pub fn invalidate_prefix(&self, prefix: &CacheKey) {
        let mut state = self.lock();
        let matching: Vec<CacheKey> = state
            .slots
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in matching {
            state.slots.pop(&key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_compare_by_segments() {
        let a = CacheKey::new(["posts", "42"]);
        let b = CacheKey::new(vec!["posts".to_string(), "42".to_string()]);
        assert_eq!(a, b);
        assert!(a.starts_with(&CacheKey::new(["posts"])));
        assert!(!a.starts_with(&CacheKey::new(["drafts"])));
        assert!(!CacheKey::new(["posts"]).starts_with(&a));
    }

    #[tokio::test]
    async fn fresh_values_are_served_from_cache() {
        let cache = QueryCache::new(CachePolicy::default());
        let key = CacheKey::new(["posts"]);
        let first = cache
            .fetch(key.clone(), async { Ok(Value::from(1)) })
            .await
            .expect("first fetch");
        assert_eq!(first, Value::from(1));

        // Second fetcher must not run while the entry is fresh.
        let second = cache
            .fetch(key, async { Ok(Value::from(2)) })
            .await
            .expect("cached fetch");
        assert_eq!(second, Value::from(1));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(CachePolicy::default());
        let key = CacheKey::new(["posts"]);
        let failed = cache
            .fetch(key.clone(), async {
                Err(ClientError::api(500, "boom"))
            })
            .await;
        assert!(failed.is_err());

        let recovered = cache
            .fetch(key, async { Ok(Value::from("ok")) })
            .await
            .expect("re-fetch after failure");
        assert_eq!(recovered, Value::from("ok"));
    }

    #[tokio::test]
    async fn invalidation_forces_a_fresh_read() {
        let cache = QueryCache::new(CachePolicy::default());
        let key = CacheKey::new(["posts", "list"]);
        let _ = cache
            .fetch(key.clone(), async { Ok(Value::from(1)) })
            .await;
        cache.invalidate_prefix(&CacheKey::new(["posts"]));
        let fresh = cache
            .fetch(key, async { Ok(Value::from(2)) })
            .await
            .expect("fresh read");
        assert_eq!(fresh, Value::from(2));
    }

    #[tokio::test]
    async fn stale_entries_are_refetched() {
        let policy = CachePolicy {
            stale_after: Duration::from_millis(0),
            ..CachePolicy::default()
        };
        let cache = QueryCache::new(policy);
        let key = CacheKey::new(["posts"]);
        let _ = cache
            .fetch(key.clone(), async { Ok(Value::from(1)) })
            .await;
        let refreshed = cache
            .fetch(key, async { Ok(Value::from(2)) })
            .await
            .expect("stale re-fetch");
        assert_eq!(refreshed, Value::from(2));
    }
}
