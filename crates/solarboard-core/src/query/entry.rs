// ── Cache entries ──
//
// One entry per query key. The observable part (value, status, error,
// timestamps) lives in a `watch` channel so subscribers see every
// transition; bookkeeping for freshness, coalescing and eviction sits
// beside it.

use std::any::Any;
use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::QueryTiming;
use crate::error::CoreError;

/// Type-erased cached value. Downcast with `Arc::downcast`.
pub(crate) type AnyValue = Arc<dyn Any + Send + Sync>;

pub(crate) type FetchResult = Result<AnyValue, CoreError>;

/// Produces a fresh fetch future each time the entry needs data.
pub(crate) type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

/// A fetch every concurrent reader can await.
pub(crate) type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Lifecycle of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FetchStatus {
    /// Never fetched, or purged.
    #[default]
    Idle,
    /// A fetch is in progress. Any earlier value stays readable.
    Loading,
    Success,
    Error,
}

/// Observable state of an entry.
#[derive(Clone, Default)]
pub(crate) struct EntryState {
    pub status: FetchStatus,
    pub data: Option<AnyValue>,
    pub error: Option<CoreError>,
    pub updated_at: Option<Instant>,
    pub invalidated: bool,
    pub fetching: bool,
}

pub(crate) struct InFlight {
    pub id: u64,
    pub generation: u64,
    pub future: SharedFetch,
}

pub(crate) struct CacheEntry {
    pub state: watch::Sender<EntryState>,
    pub timing: QueryTiming,
    /// Bumped by invalidation, direct writes and purges.
    pub generation: u64,
    /// Generation of the fetch (or write) that produced the cached value.
    pub data_generation: u64,
    pub in_flight: Option<InFlight>,
    pub fetcher: Option<Fetcher>,
    pub observers: usize,
    pub last_used: Instant,
}

impl CacheEntry {
    pub fn new(timing: QueryTiming, now: Instant) -> Self {
        let (state, _) = watch::channel(EntryState::default());
        Self {
            state,
            timing,
            generation: 0,
            data_generation: 0,
            in_flight: None,
            fetcher: None,
            observers: 0,
            last_used: now,
        }
    }

    pub fn data(&self) -> Option<AnyValue> {
        self.state.borrow().data.clone()
    }

    pub fn is_invalidated(&self) -> bool {
        self.state.borrow().invalidated
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        self.state
            .borrow()
            .updated_at
            .is_none_or(|at| now.saturating_duration_since(at) >= self.timing.stale_time)
    }

    /// The in-flight fetch, if it was started for the current generation.
    pub fn current_fetch(&self) -> Option<SharedFetch> {
        self.in_flight
            .as_ref()
            .filter(|f| f.generation == self.generation)
            .map(|f| f.future.clone())
    }

    /// Eligible for garbage collection at `now`.
    pub fn is_collectable(&self, now: Instant) -> bool {
        self.observers == 0
            && self.in_flight.is_none()
            && now.saturating_duration_since(self.last_used) >= self.timing.gc_time
    }

    /// Drop everything cached while keeping subscribers attached.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.data_generation = self.generation;
        self.in_flight = None;
        self.state.send_replace(EntryState::default());
    }
}
