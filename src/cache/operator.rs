//! Cache decorator for asynchronous data producers
//!
//! Wraps a producer so each activation first consults the `CacheStore` and only
//! runs the producer on a miss, persisting whatever it yields.

use futures::future::{self, Either};
use futures::stream::{self, Stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;

use super::CacheStore;

/// Where and for how long a producer's results are cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Cache key; must be unique per logical resource
    pub key: String,
    /// How long a cached value stays valid; `None` never expires
    pub expire_in: Option<Duration>,
}

impl CachePolicy {
    /// A policy for `key` whose entries never expire
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expire_in: None,
        }
    }

    /// Sets the expiration duration
    pub fn expire_in(mut self, expire_in: Duration) -> Self {
        self.expire_in = Some(expire_in);
        self
    }
}

/// Runs one activation of `producer` through the cache
///
/// On a hit the cached value is returned and `producer` is never called. On a
/// miss `producer` runs once; a successful value is written to the cache before
/// being returned, an error is returned unchanged and nothing is written.
/// Cache read and write faults never reach the caller.
pub async fn cached<T, E, F, Fut>(store: &CacheStore, policy: &CachePolicy, producer: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(value) = store.get(&policy.key, policy.expire_in) {
        return Ok(value);
    }

    let value = producer().await?;
    persist(store, policy, &value);
    Ok(value)
}

/// Emits the cached value if there is one, else every item of the stream made by `make_source`
///
/// The cache is consulted when the returned stream is first polled. On a miss
/// each `Ok` item overwrites the cache entry as it passes through, so the entry
/// always holds the newest value emitted.
pub fn cached_stream<'a, T, E, F, S>(
    store: &'a CacheStore,
    policy: &'a CachePolicy,
    make_source: F,
) -> impl Stream<Item = Result<T, E>> + 'a
where
    T: Serialize + DeserializeOwned + 'a,
    E: 'a,
    F: FnOnce() -> S + 'a,
    S: Stream<Item = Result<T, E>> + 'a,
{
    stream::once(async move {
        match store.get::<T>(&policy.key, policy.expire_in) {
            Some(value) => Either::Left(stream::once(future::ready(Ok(value)))),
            None => Either::Right(make_source().inspect(move |item| {
                if let Ok(value) = item {
                    persist(store, policy, value);
                }
            })),
        }
    })
    .flatten()
}

/// A producer bound to a cache policy, activated by `fetch`
///
/// The cache lookup happens anew on every `fetch`, never once at construction.
pub struct Cached<'a, F> {
    store: &'a CacheStore,
    policy: CachePolicy,
    producer: F,
}

impl<'a, F> Cached<'a, F> {
    pub fn new(store: &'a CacheStore, policy: CachePolicy, producer: F) -> Self {
        Self {
            store,
            policy,
            producer,
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Runs one activation
    pub async fn fetch<T, E, Fut>(&self) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        cached(self.store, &self.policy, &self.producer).await
    }
}

fn persist<T: Serialize>(store: &CacheStore, policy: &CachePolicy, value: &T) {
    if let Err(e) = store.set(&policy.key, value) {
        tracing::warn!(key = %policy.key, error = %e, "failed to write cache entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::storage::{MemoryStorage, Storage, StorageError};
    use chrono::Utc;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A medium whose every operation fails
    #[derive(Debug)]
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied").into())
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(io::Error::new(io::ErrorKind::Other, "quota exceeded").into())
        }
    }

    fn create_test_cache() -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = CacheStore::new(Arc::new(MemoryStorage::new())).with_clock(clock.clone());
        (cache, clock)
    }

    async fn counting_producer(calls: &AtomicUsize) -> Result<u32, String> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(n as u32 * 10)
    }

    #[tokio::test]
    async fn test_two_activations_invoke_producer_once() {
        let (cache, _clock) = create_test_cache();
        let policy = CachePolicy::new("counter").expire_in(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = cached(&cache, &policy, || counting_producer(&calls)).await;
        let second = cached(&cache, &policy, || counting_producer(&calls)).await;

        assert_eq!(first, Ok(10));
        assert_eq!(second, Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_producer_runs_again_after_expiry() {
        let (cache, clock) = create_test_cache();
        let policy = CachePolicy::new("counter").expire_in(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        cached(&cache, &policy, || counting_producer(&calls)).await.unwrap();
        clock.advance(chrono::Duration::seconds(61));
        let refreshed = cached(&cache, &policy, || counting_producer(&calls)).await;

        assert_eq!(refreshed, Ok(20));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get::<u32>("counter", None), Some(20));
    }

    #[tokio::test]
    async fn test_cached_wrapper_checks_cache_on_every_fetch() {
        let (cache, clock) = create_test_cache();
        let calls = AtomicUsize::new(0);
        let wrapped = Cached::new(
            &cache,
            CachePolicy::new("wrapped").expire_in(Duration::from_secs(60)),
            || counting_producer(&calls),
        );

        assert_eq!(wrapped.fetch().await, Ok(10));
        assert_eq!(wrapped.fetch().await, Ok(10));
        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(wrapped.fetch().await, Ok(20));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(wrapped.policy().key, "wrapped");
    }

    #[tokio::test]
    async fn test_store_fault_falls_through_to_producer() {
        let cache = CacheStore::new(Arc::new(BrokenStorage));
        let policy = CachePolicy::new("k");
        let calls = AtomicUsize::new(0);

        let result = cached(&cache, &policy, || counting_producer(&calls)).await;

        assert_eq!(result, Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_producer_error_propagates_and_leaves_cache_untouched() {
        let (cache, _clock) = create_test_cache();
        let policy = CachePolicy::new("k");

        let result: Result<u32, String> =
            cached(&cache, &policy, || async { Err("not found".to_string()) }).await;

        assert_eq!(result, Err("not found".to_string()));
        assert_eq!(cache.get::<u32>("k", None), None);
    }

    #[tokio::test]
    async fn test_producer_error_keeps_stale_value() {
        let (cache, clock) = create_test_cache();
        let policy = CachePolicy::new("k").expire_in(Duration::from_secs(60));

        cache.set("k", &1u32).unwrap();
        clock.advance(chrono::Duration::seconds(120));

        let result: Result<u32, String> =
            cached(&cache, &policy, || async { Err("offline".to_string()) }).await;

        assert!(result.is_err());
        assert_eq!(cache.get::<u32>("k", None), Some(1));
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_through_to_producer() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = CacheStore::new(storage.clone());
        storage.set_item("CACHE.k", "{broken").unwrap();

        let result: Result<u32, String> = cached(&cache, &CachePolicy::new("k"), || async { Ok(3) }).await;

        assert_eq!(result, Ok(3));
        assert_eq!(cache.get::<u32>("k", None), Some(3));
    }

    #[tokio::test]
    async fn test_stream_miss_persists_each_emitted_value() {
        let (cache, _clock) = create_test_cache();
        let policy = CachePolicy::new("stream");

        let items: Vec<Result<u32, String>> = cached_stream(&cache, &policy, || {
            stream::iter(vec![Ok(1), Ok(2), Ok(3)])
        })
        .collect()
        .await;

        assert_eq!(items, vec![Ok(1), Ok(2), Ok(3)]);
        assert_eq!(cache.get::<u32>("stream", None), Some(3));
    }

    #[tokio::test]
    async fn test_stream_hit_emits_cached_value_without_source() {
        let (cache, _clock) = create_test_cache();
        let policy = CachePolicy::new("stream");
        cache.set("stream", &7u32).unwrap();
        let made = AtomicUsize::new(0);

        let items: Vec<Result<u32, String>> = cached_stream(&cache, &policy, || {
            made.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![Ok(1)])
        })
        .collect()
        .await;

        assert_eq!(items, vec![Ok(7)]);
        assert_eq!(made.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stream_error_items_are_not_persisted() {
        let (cache, _clock) = create_test_cache();
        let policy = CachePolicy::new("stream");

        let items: Vec<Result<u32, String>> = cached_stream(&cache, &policy, || {
            stream::iter(vec![Ok(1), Err("boom".to_string())])
        })
        .collect()
        .await;

        assert_eq!(items.len(), 2);
        assert_eq!(cache.get::<u32>("stream", None), Some(1));
    }

    #[tokio::test]
    async fn test_stream_lookup_is_deferred_until_polled() {
        let (cache, _clock) = create_test_cache();
        let policy = CachePolicy::new("late");

        let pending = cached_stream(&cache, &policy, || stream::iter(vec![Ok::<u32, String>(1)]));
        cache.set("late", &9u32).unwrap();
        let items: Vec<Result<u32, String>> = pending.collect().await;

        assert_eq!(items, vec![Ok(9)]);
    }
}
