// ── Runtime console configuration ──
//
// These types describe *where* the backend lives and *how long* cached
// data stays fresh. They never touch disk: the CLI (or any other host)
// builds a `ConsoleConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use solarboard_api::TlsMode;
use url::Url;

const MINUTE: Duration = Duration::from_secs(60);

/// Freshness and retention for one family of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTiming {
    /// How long a successful result is served without a network call.
    pub stale_time: Duration,
    /// How long an unobserved, idle entry survives before eviction.
    pub gc_time: Duration,
    /// Disabled queries never fetch on read; only an explicit refetch runs them.
    pub enabled: bool,
}

impl QueryTiming {
    pub const fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
            enabled: true,
        }
    }

    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for QueryTiming {
    fn default() -> Self {
        Self::new(Duration::ZERO, 5 * MINUTE)
    }
}

/// Per-resource cache timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    pub ads: QueryTiming,
    pub shops: QueryTiming,
    pub engineers: QueryTiming,
    pub products: QueryTiming,
    pub counts: QueryTiming,
    pub analytics: QueryTiming,
    pub activities: QueryTiming,
}

impl Default for CachePolicy {
    fn default() -> Self {
        let five = QueryTiming::new(5 * MINUTE, 5 * MINUTE);
        Self {
            ads: five,
            shops: five,
            engineers: five,
            products: QueryTiming::new(5 * MINUTE, 10 * MINUTE),
            counts: five,
            analytics: QueryTiming::new(10 * MINUTE, 5 * MINUTE).disabled(),
            activities: QueryTiming::new(2 * MINUTE, 5 * MINUTE).disabled(),
        }
    }
}

/// Media host settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: Url,
    pub api_key: SecretString,
}

/// Everything a [`Console`](crate::Console) needs to talk to the backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API host root, e.g. `https://api.example.com`.
    pub api_url: Url,
    /// `None` disables image uploads.
    pub upload: Option<UploadConfig>,
    pub tls: TlsMode,
    /// Client-side timeout for API calls. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    pub cache: CachePolicy,
    /// Background garbage-collection interval. `None` = collect only on demand.
    pub gc_interval: Option<Duration>,
}

impl ConsoleConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            upload: None,
            tls: TlsMode::System,
            timeout: None,
            cache: CachePolicy::default(),
            gc_interval: Some(MINUTE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_resource_windows() {
        let p = CachePolicy::default();
        assert_eq!(p.ads.stale_time, Duration::from_secs(300));
        assert_eq!(p.products.gc_time, Duration::from_secs(600));
        assert_eq!(p.analytics.stale_time, Duration::from_secs(600));
        assert_eq!(p.activities.stale_time, Duration::from_secs(120));
        assert!(!p.analytics.enabled);
        assert!(!p.activities.enabled);
        assert!(p.counts.enabled);
    }
}
