// ── Query cache ──
//
// Keyed store of query results with staleness, request coalescing,
// prefix invalidation and garbage collection. All network work runs in
// spawned tasks that report back through `complete`, so a caller that
// stops waiting never aborts a request other callers are sharing.
//
// Locking rule: a DashMap guard is never held across an `.await`.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::entry::{AnyValue, CacheEntry, FetchResult, FetchStatus, Fetcher, InFlight, SharedFetch};
use super::key::QueryKey;
use crate::config::QueryTiming;
use crate::error::CoreError;
use crate::stream::{ObserverGuard, QueryStream};

/// Shared query cache. Cheaply cloneable.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: DashMap<QueryKey, CacheEntry>,
    /// Bumped by every purge. Fetches started under an older epoch are discarded.
    epoch: AtomicU64,
    next_fetch_id: AtomicU64,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.len())
            .field("epoch", &self.inner.epoch.load(Ordering::SeqCst))
            .finish()
    }
}

enum ReadPlan {
    Ready(AnyValue),
    Wait(SharedFetch),
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Read `key`, fetching only when the cache cannot answer.
    ///
    /// - fresh value: returned with no network call
    /// - stale value: returned immediately, one background refetch started
    /// - missing or invalidated value: waits for a fetch, joining one
    ///   already in flight for the same generation
    ///
    /// Disabled queries return [`CoreError::QueryDisabled`] without
    /// creating an entry.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        timing: QueryTiming,
        fetcher: F,
    ) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        if !timing.enabled {
            return Err(CoreError::QueryDisabled {
                key: key.to_string(),
            });
        }

        let plan = self.plan_read(key, timing, erase(fetcher));
        let value = match plan {
            ReadPlan::Ready(value) => value,
            ReadPlan::Wait(fetch) => fetch.await?,
        };
        downcast(key, value)
    }

    fn plan_read(&self, key: &QueryKey, timing: QueryTiming, fetcher: Fetcher) -> ReadPlan {
        let now = Instant::now();
        let mut entry = self
            .inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(timing, now));
        entry.timing = timing;
        entry.fetcher = Some(fetcher);
        entry.last_used = now;

        let usable = if entry.is_invalidated() {
            None
        } else {
            entry.data()
        };

        match usable {
            Some(value) if !entry.is_stale(now) => {
                trace!(%key, "cache hit");
                ReadPlan::Ready(value)
            }
            Some(value) => {
                if entry.current_fetch().is_none() {
                    debug!(%key, "stale, revalidating in background");
                    self.start_fetch(key, &mut entry);
                }
                ReadPlan::Ready(value)
            }
            None => {
                let fetch = match entry.current_fetch() {
                    Some(fetch) => {
                        trace!(%key, "joining in-flight fetch");
                        fetch
                    }
                    None => self.start_fetch(key, &mut entry),
                };
                ReadPlan::Wait(fetch)
            }
        }
    }

    /// Fetch `key` now regardless of freshness or `enabled`.
    ///
    /// Joins a fetch already in flight for the current generation.
    pub async fn refetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        timing: QueryTiming,
        fetcher: F,
    ) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let fetch = {
            let now = Instant::now();
            let mut entry = self
                .inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(timing, now));
            entry.timing = timing;
            entry.fetcher = Some(erase(fetcher));
            entry.last_used = now;
            match entry.current_fetch() {
                Some(fetch) => fetch,
                None => self.start_fetch(key, &mut entry),
            }
        };
        downcast(key, fetch.await?)
    }

    /// Subscribe to `key`. Starts a fetch when the entry is enabled and
    /// has nothing fresh to show.
    pub fn subscribe<T, F, Fut>(&self, key: &QueryKey, timing: QueryTiming, fetcher: F) -> QueryStream<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let now = Instant::now();
        let receiver = {
            let mut entry = self
                .inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(timing, now));
            entry.timing = timing;
            entry.fetcher = Some(erase(fetcher));
            entry.observers += 1;
            entry.last_used = now;

            let needs_data =
                entry.data().is_none() || entry.is_invalidated() || entry.is_stale(now);
            if timing.enabled && needs_data && entry.current_fetch().is_none() {
                self.start_fetch(key, &mut entry);
            }
            entry.state.subscribe()
        };

        let guard = ObserverGuard::new(self.clone(), key.clone());
        QueryStream::new(key.clone(), receiver, guard)
    }

    pub(crate) fn release_observer(&self, key: &QueryKey) {
        if let Some(mut entry) = self.inner.entries.get_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
            entry.last_used = Instant::now();
        }
    }

    /// The cached value for `key`, without fetching.
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.inner.entries.get(key)?.data()?;
        value.downcast::<T>().ok()
    }

    pub fn status(&self, key: &QueryKey) -> Option<FetchStatus> {
        self.inner
            .entries
            .get(key)
            .map(|entry| entry.state.borrow().status)
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_invalidated())
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.inner
            .entries
            .get(key)
            .map_or(0, |entry| entry.observers)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Mark every entry under `prefix` invalidated and refetch the ones
    /// with live observers. Cached values stay visible until replaced.
    ///
    /// Returns the number of entries touched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut touched = 0;
        for mut item in self.inner.entries.iter_mut() {
            let (key, entry) = item.pair_mut();
            if !key.starts_with(prefix) {
                continue;
            }
            touched += 1;
            entry.generation += 1;
            entry.state.send_modify(|s| s.invalidated = true);

            if entry.observers > 0 && entry.timing.enabled {
                trace!(%key, "refetching observed query");
                self.start_fetch(key, entry);
            }
        }
        debug!(%prefix, touched, "invalidated");
        touched
    }

    /// Write a value directly, as if a fetch had just returned it.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        let now = Instant::now();
        let mut entry = self
            .inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(QueryTiming::default(), now));
        entry.generation += 1;
        entry.data_generation = entry.generation;
        entry.last_used = now;

        let value: AnyValue = Arc::new(value);
        entry.state.send_modify(|s| {
            s.data = Some(value);
            s.status = FetchStatus::Success;
            s.error = None;
            s.updated_at = Some(now);
            s.invalidated = false;
        });
        trace!(%key, "query data set");
    }

    /// Purge everything. Observed entries are reset to idle and stay
    /// subscribed; the rest are removed. Fetches still in flight are
    /// discarded when they land.
    pub fn clear(&self) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.entries.retain(|_, entry| {
            if entry.observers == 0 {
                return false;
            }
            entry.reset();
            true
        });
        debug!(epoch, "cache purged");
    }

    // ── Garbage collection ───────────────────────────────────────────

    /// Evict entries with no observers, nothing in flight, and no use
    /// within their `gc_time`. Returns the number evicted.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.inner.entries.retain(|key, entry| {
            let keep = !entry.is_collectable(now);
            if !keep {
                trace!(%key, "evicted");
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Run [`collect_garbage`](Self::collect_garbage) every `interval`
    /// until `cancel` fires.
    pub fn spawn_gc(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = cache.collect_garbage();
                        if evicted > 0 {
                            debug!(evicted, "garbage collected");
                        }
                    }
                }
            }
        })
    }

    // ── Fetch machinery ──────────────────────────────────────────────

    /// Spawn a fetch for the entry's current generation and record it as
    /// the entry's in-flight fetch.
    fn start_fetch(&self, key: &QueryKey, entry: &mut CacheEntry) -> SharedFetch {
        let Some(fetcher) = entry.fetcher.clone() else {
            let err = CoreError::UnknownQuery {
                key: key.to_string(),
            };
            return futures_util::future::ready(Err(err)).boxed().shared();
        };

        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::SeqCst);
        let generation = entry.generation;
        let epoch = self.inner.epoch.load(Ordering::SeqCst);

        let cache = self.clone();
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let result = fetcher().await;
            cache.complete(&task_key, id, generation, epoch, result)
        });

        let label = key.to_string();
        let future = async move {
            task.await.unwrap_or_else(|e| {
                Err(CoreError::Internal(format!("fetch for {label} panicked: {e}")))
            })
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            id,
            generation,
            future: future.clone(),
        });
        entry.state.send_modify(|s| {
            s.status = FetchStatus::Loading;
            s.fetching = true;
        });
        debug!(%key, generation, "fetch started");
        future
    }

    /// Record a finished fetch and return what its waiters should see.
    ///
    /// Values never overwrite data from a newer generation, and only a
    /// fetch of the current generation clears the invalidated flag.
    fn complete(
        &self,
        key: &QueryKey,
        id: u64,
        generation: u64,
        epoch: u64,
        result: FetchResult,
    ) -> FetchResult {
        let entry = self.inner.entries.get_mut(key);

        // Checked while holding the entry's shard lock, so a concurrent
        // purge either runs entirely before or entirely after this write.
        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            warn!(%key, "discarding result of fetch started before cache purge");
            return match result {
                Ok(_) => Err(CoreError::Cancelled {
                    key: key.to_string(),
                }),
                Err(e) => Err(e),
            };
        }

        let Some(mut entry) = entry else {
            return result;
        };

        if entry.in_flight.as_ref().is_some_and(|f| f.id == id) {
            entry.in_flight = None;
        }
        let still_fetching = entry.in_flight.is_some();
        let current = generation == entry.generation;
        let now = Instant::now();

        match &result {
            Ok(value) if generation >= entry.data_generation => {
                entry.data_generation = generation;
                let value = value.clone();
                entry.state.send_modify(|s| {
                    s.data = Some(value);
                    s.status = FetchStatus::Success;
                    s.error = None;
                    s.updated_at = Some(now);
                    if current {
                        s.invalidated = false;
                    }
                    s.fetching = still_fetching;
                });
                debug!(%key, generation, "fetch stored");
            }
            Err(e) if current => {
                let e = e.clone();
                entry.state.send_modify(|s| {
                    s.status = FetchStatus::Error;
                    s.error = Some(e);
                    s.fetching = still_fetching;
                });
                debug!(%key, generation, "fetch failed");
            }
            _ => {
                trace!(%key, generation, "superseded fetch ignored");
                entry.state.send_modify(|s| s.fetching = still_fetching);
            }
        }

        result
    }
}

/// Box a typed fetcher into the cache's type-erased form.
fn erase<T, F, Fut>(fetcher: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move { fut.await.map(|value| Arc::new(value) as AnyValue) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: AnyValue) -> Result<Arc<T>, CoreError> {
    value.downcast::<T>().map_err(|_| CoreError::TypeMismatch {
        key: key.to_string(),
    })
}
