// ── Query subscriptions ──
//
// A subscription keeps its cache entry alive (observer count), sees every
// state transition of that entry, and stops delivering once its
// cancellation token fires or it is dropped.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error::CoreError;
use crate::query::{EntryState, FetchStatus, QueryCache, QueryKey};

/// Point-in-time view of a query.
pub struct QuerySnapshot<T> {
    pub status: FetchStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<CoreError>,
    /// A fetch is running, either first load or revalidation.
    pub is_fetching: bool,
    /// The value is known to be out of date and a refetch is due.
    pub is_invalidated: bool,
}

impl<T: Send + Sync + 'static> QuerySnapshot<T> {
    fn from_state(state: &EntryState) -> Self {
        Self {
            status: state.status,
            data: state
                .data
                .clone()
                .and_then(|value| value.downcast::<T>().ok()),
            error: state.error.clone(),
            is_fetching: state.fetching,
            is_invalidated: state.invalidated,
        }
    }
}

impl<T> QuerySnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading && self.data.is_none()
    }
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            is_invalidated: self.is_invalidated,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for QuerySnapshot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySnapshot")
            .field("status", &self.status)
            .field("data", &self.data)
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("is_invalidated", &self.is_invalidated)
            .finish()
    }
}

/// Counts as one observer of a cache entry for as long as it lives.
pub(crate) struct ObserverGuard {
    cache: QueryCache,
    key: QueryKey,
}

impl ObserverGuard {
    pub(crate) fn new(cache: QueryCache, key: QueryKey) -> Self {
        Self { cache, key }
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.cache.release_observer(&self.key);
    }
}

/// A live subscription to one query key.
pub struct QueryStream<T> {
    key: QueryKey,
    current: QuerySnapshot<T>,
    receiver: watch::Receiver<EntryState>,
    cancel: CancellationToken,
    _guard: ObserverGuard,
}

impl<T: Send + Sync + 'static> QueryStream<T> {
    pub(crate) fn new(key: QueryKey, mut receiver: watch::Receiver<EntryState>, guard: ObserverGuard) -> Self {
        let current = QuerySnapshot::from_state(&receiver.borrow_and_update());
        Self {
            key,
            current,
            receiver,
            cancel: CancellationToken::new(),
            _guard: guard,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &QuerySnapshot<T> {
        &self.current
    }

    /// The entry's state right now.
    pub fn latest(&self) -> QuerySnapshot<T> {
        QuerySnapshot::from_state(&self.receiver.borrow())
    }

    /// Wait for the next transition. `None` once cancelled, or if the
    /// entry was evicted.
    pub async fn changed(&mut self) -> Option<QuerySnapshot<T>> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let changed = tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            res = self.receiver.changed() => res.is_ok(),
        };
        if !changed {
            return None;
        }

        let snapshot = QuerySnapshot::from_state(&self.receiver.borrow_and_update());
        self.current = snapshot.clone();
        Some(snapshot)
    }

    /// Token that ends this subscription when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Convert into a `Stream` that yields the current state first.
    pub fn into_stream(self) -> QueryWatchStream<T> {
        let cancelled = Box::pin(self.cancel.clone().cancelled_owned());
        QueryWatchStream {
            inner: WatchStream::new(self.receiver),
            cancelled,
            done: false,
            _guard: self._guard,
            _marker: PhantomData,
        }
    }
}

/// `Stream` adapter over a [`QueryStream`].
pub struct QueryWatchStream<T> {
    inner: WatchStream<EntryState>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    done: bool,
    _guard: ObserverGuard,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Stream for QueryWatchStream<T> {
    type Item = QuerySnapshot<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Every field is Unpin.
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        if this.cancelled.as_mut().poll(cx).is_ready() {
            this.done = true;
            return Poll::Ready(None);
        }
        Pin::new(&mut this.inner)
            .poll_next(cx)
            .map(|state| state.map(|s| QuerySnapshot::from_state(&s)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use futures_util::StreamExt;
    use tokio_test::{assert_pending, assert_ready};

    use super::*;
    use crate::config::QueryTiming;
    use crate::query::{Filters, keys};

    fn timing() -> QueryTiming {
        QueryTiming::new(Duration::from_secs(300), Duration::from_secs(300))
    }

    async fn slow_value() -> Result<u32, CoreError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(42)
    }

    #[tokio::test(start_paused = true)]
    async fn subscription_sees_load_then_value() {
        let cache = QueryCache::new();
        let key = keys::ADS.list(&Filters::new());
        let mut stream = cache.subscribe(&key, timing(), slow_value);

        assert!(stream.current().is_loading());
        assert_eq!(cache.observer_count(&key), 1);

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.status, FetchStatus::Success);
        assert_eq!(snap.data.as_deref(), Some(&42));
        assert!(!snap.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_keeps_value_for_observers() {
        let cache = QueryCache::new();
        let key = keys::SHOPS.list(&Filters::new());
        cache.set_query_data(&key, 7_u32);

        let mut stream = cache.subscribe(&key, timing(), slow_value);
        assert_eq!(stream.current().data.as_deref(), Some(&7));

        cache.invalidate(&keys::SHOPS.lists());
        let snap = stream.changed().await.unwrap();
        assert!(snap.is_invalidated);
        assert_eq!(snap.data.as_deref(), Some(&7));

        let mut last = snap;
        while last.is_invalidated || last.is_fetching {
            last = stream.changed().await.unwrap();
        }
        assert_eq!(last.data.as_deref(), Some(&42));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_subscription_stops_delivering() {
        let cache = QueryCache::new();
        let key = keys::PRODUCTS.detail("p1");
        cache.set_query_data(&key, 1_u32);
        let mut stream = cache.subscribe(&key, timing(), slow_value);

        let mut next = tokio_test::task::spawn(stream.changed());
        assert_pending!(next.poll());
        drop(next);

        stream.cancel();
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_subscription_releases_observer() {
        let cache = QueryCache::new();
        let key = keys::ENGINEERS.list(&Filters::new());
        let stream = cache.subscribe(&key, timing(), slow_value);
        assert_eq!(cache.observer_count(&key), 1);
        drop(stream);
        assert_eq!(cache.observer_count(&key), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_stream_yields_current_then_ends_on_cancel() {
        let cache = QueryCache::new();
        let key = keys::ADS.detail("a1");
        cache.set_query_data(&key, 5_u32);

        let stream = cache.subscribe(&key, timing(), slow_value);
        let token = stream.cancel_token();
        let mut watch = tokio_test::task::spawn(stream.into_stream());

        let first = assert_ready!(watch.poll_next()).unwrap();
        assert_eq!(first.data.as_deref(), Some(&5));
        assert_pending!(watch.poll_next());

        token.cancel();
        assert!(watch.is_woken());
        assert!(assert_ready!(watch.poll_next()).is_none());
        drop(watch);
        assert_eq!(cache.observer_count(&key), 0);

        // Unrelated to the stream: the cache is still usable.
        let again: Vec<_> = cache
            .subscribe::<u32, _, _>(&key, timing(), slow_value)
            .into_stream()
            .take(1)
            .collect()
            .await;
        assert_eq!(again.len(), 1);
    }
}
