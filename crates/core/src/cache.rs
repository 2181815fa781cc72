//! Region/key cache capability.
//!
//! The database layer never owns a cache. It is handed something that
//! implements [`Cache`] and uses it for read-through lookups and explicit
//! eviction after writes. [`MemoryCache`] is the in-process implementation.

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// A cache partitioned into named regions.
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Look up a cached value.
    async fn get(&self, region: &str, key: &str) -> Option<V>;

    /// Store a value, replacing any previous entry.
    async fn put(&self, region: &str, key: &str, value: V);

    /// Drop an entry. Returns `true` if one was present.
    async fn evict(&self, region: &str, key: &str) -> bool;
}

/// Return the cached value for `key`, or run `compute`, store its result and return it.
///
/// Errors from `compute` are returned as-is and nothing is cached.
pub async fn get_or_compute<V, C, F, Fut, E>(
    cache: &C,
    region: &str,
    key: &str,
    compute: F,
) -> Result<V, E>
where
    V: Clone + Send + Sync + 'static,
    C: Cache<V> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(hit) = cache.get(region, key).await {
        tracing::trace!(region, key, "Cache hit");
        return Ok(hit);
    }
    tracing::trace!(region, key, "Cache miss");
    let value = compute().await?;
    cache.put(region, key, value.clone()).await;
    Ok(value)
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// Unbounded in-process cache.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<(String, String), V>>,
}

impl<V> MemoryCache<V> {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached entries across all regions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Returns `true` if `key` is cached in `region`.
    pub async fn contains(&self, region: &str, key: &str) -> bool {
        self.entries
            .read()
            .await
            .contains_key(&(region.to_string(), key.to_string()))
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, region: &str, key: &str) -> Option<V> {
        self.entries
            .read()
            .await
            .get(&(region.to_string(), key.to_string()))
            .cloned()
    }

    async fn put(&self, region: &str, key: &str, value: V) {
        self.entries
            .write()
            .await
            .insert((region.to_string(), key.to_string()), value);
    }

    async fn evict(&self, region: &str, key: &str) -> bool {
        self.entries
            .write()
            .await
            .remove(&(region.to_string(), key.to_string()))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_compute_runs_once() {
        let cache = MemoryCache::<Option<i64>>::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<Option<i64>, ()> = get_or_compute(&cache, "r", "k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(7))
            })
            .await;
            assert_eq!(value, Ok(Some(7)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_negative_values_are_cached() {
        let cache = MemoryCache::<Option<i64>>::new();
        let first: Result<_, ()> =
            get_or_compute(&cache, "r", "missing", || async { Ok(None) }).await;
        assert_eq!(first, Ok(None));
        assert!(cache.contains("r", "missing").await);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = MemoryCache::<i64>::new();
        let result: Result<i64, &str> =
            get_or_compute(&cache, "r", "k", || async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_is_scoped_to_region() {
        let cache = MemoryCache::<i64>::new();
        cache.put("a", "k", 1).await;
        cache.put("b", "k", 2).await;

        assert!(cache.evict("a", "k").await);
        assert!(!cache.evict("a", "k").await);
        assert_eq!(cache.get("b", "k").await, Some(2));
        assert_eq!(cache.len().await, 1);
    }
}
