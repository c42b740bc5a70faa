//! Query cache keyed by segment lists, with prefix invalidation.
//!
//! Mutations name the keys they affect (`["clusters"]`, `["cluster", id]`)
//! and readers refetch whatever was marked stale.

use crate::error::Result;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Identifies one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// `["clusters"]`, every cluster list.
    pub fn clusters() -> Self {
        Self::new(["clusters"])
    }

    /// `["cluster", id]`, one cluster.
    pub fn cluster(id: &str) -> Self {
        Self::new(["cluster", id])
    }

    /// `["spores"]`, every spore list.
    pub fn spores() -> Self {
        Self::new(["spores"])
    }

    /// `["spore", id]`, one spore.
    pub fn spore(id: &str) -> Self {
        Self::new(["spore", id])
    }

    /// Append a segment, e.g. a page number or owner.
    pub fn with(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Whether `self` begins with every segment of `prefix`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stale: bool,
}

/// In-process query cache.
#[derive(Default)]
pub struct QueryClient {
    entries: RwLock<HashMap<QueryKey, Entry>>,
}

impl QueryClient {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` when fresh, otherwise run
    /// `loader` and cache its result. Errors are not cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, loader: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get_fresh::<T>(&key) {
            tracing::trace!(%key, "Query cache hit");
            return Ok(value);
        }

        tracing::trace!(%key, "Query cache miss");
        let value = loader().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Store a value as fresh.
    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.entries.write().insert(
            key,
            Entry {
                value: Arc::new(value),
                stale: false,
            },
        );
    }

    /// The cached value, fresh or stale.
    pub fn get<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.entries
            .read()
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    fn get_fresh<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.stale)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    /// Whether `key` is cached but stale; `None` when not cached.
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries.read().get(key).map(|entry| entry.stale)
    }

    /// Mark every key starting with `prefix` stale. Returns how many
    /// entries were affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                count += 1;
            }
        }
        tracing::debug!(%prefix, count, "Invalidated queries");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fetch_caches_until_invalidated() {
        let cache = QueryClient::new();
        let loads = AtomicUsize::new(0);
        let counter = &loads;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["a".to_string()])
        };

        cache.fetch(QueryKey::clusters(), load).await.unwrap();
        cache.fetch(QueryKey::clusters(), load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate(&QueryKey::clusters());
        assert_eq!(cache.is_stale(&QueryKey::clusters()), Some(true));
        cache.fetch(QueryKey::clusters(), load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.is_stale(&QueryKey::clusters()), Some(false));
    }

    #[test]
    fn invalidation_is_by_prefix() {
        let cache = QueryClient::new();
        cache.set(QueryKey::clusters().with("page-1"), 1u32);
        cache.set(QueryKey::clusters().with("page-2"), 2u32);
        cache.set(QueryKey::cluster("0xaa"), 3u32);
        cache.set(QueryKey::cluster("0xbb"), 4u32);

        assert_eq!(cache.invalidate(&QueryKey::clusters()), 2);
        assert_eq!(cache.invalidate(&QueryKey::cluster("0xaa")), 1);
        assert_eq!(cache.is_stale(&QueryKey::cluster("0xbb")), Some(false));
        assert_eq!(cache.get::<u32>(&QueryKey::cluster("0xaa")), Some(3));
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryClient::new();
        let result: Result<u32> = cache
            .fetch(QueryKey::spores(), || async {
                Err(ClientError::InvalidResponse("boom".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.is_stale(&QueryKey::spores()), None);
    }

    #[test]
    fn key_display() {
        assert_eq!(QueryKey::cluster("0x01").to_string(), "[cluster, 0x01]");
    }
}
