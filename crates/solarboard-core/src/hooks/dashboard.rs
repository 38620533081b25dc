// Dashboard counters, analytics and the activity feed.
//
// Analytics and activities are disabled queries by default: plain reads
// only return what is already cached, and `refresh_*` fetches them.

use std::sync::Arc;

use solarboard_api::{Activity, DashboardAnalytics, DashboardCounts};

use super::optional;
use crate::console::Console;
use crate::error::CoreError;
use crate::query::keys;
use crate::stream::QueryStream;

impl Console {
    pub async fn dashboard_counts(&self) -> Result<Arc<DashboardCounts>, CoreError> {
        let timing = self.config().cache.counts;
        self.query(&keys::DASHBOARD.counts(), timing, |api| async move {
            api.dashboard_counts().await
        })
        .await
    }

    pub fn watch_dashboard_counts(&self) -> QueryStream<DashboardCounts> {
        let timing = self.config().cache.counts;
        self.watch(&keys::DASHBOARD.counts(), timing, |api| async move {
            api.dashboard_counts().await
        })
    }

    /// Cached analytics, or a fetch when the query is enabled.
    pub async fn dashboard_analytics(&self) -> Result<Option<Arc<DashboardAnalytics>>, CoreError> {
        let key = keys::DASHBOARD.analytics();
        let timing = self.config().cache.analytics;
        let read = self
            .query(&key, timing, |api| async move { api.dashboard_analytics().await })
            .await;
        optional(read).map(|v| v.or_else(|| self.cache().get_query_data(&key)))
    }

    pub async fn refresh_dashboard_analytics(&self) -> Result<Arc<DashboardAnalytics>, CoreError> {
        let timing = self.config().cache.analytics;
        self.refetch(&keys::DASHBOARD.analytics(), timing, |api| async move {
            api.dashboard_analytics().await
        })
        .await
    }

    /// Cached activity feed, or a fetch when the query is enabled.
    pub async fn recent_activities(&self) -> Result<Option<Arc<Vec<Activity>>>, CoreError> {
        let key = keys::DASHBOARD.activities();
        let timing = self.config().cache.activities;
        let read = self
            .query(&key, timing, |api| async move { api.recent_activities().await })
            .await;
        optional(read).map(|v| v.or_else(|| self.cache().get_query_data(&key)))
    }

    pub async fn refresh_recent_activities(&self) -> Result<Arc<Vec<Activity>>, CoreError> {
        let timing = self.config().cache.activities;
        self.refetch(&keys::DASHBOARD.activities(), timing, |api| async move {
            api.recent_activities().await
        })
        .await
    }
}
