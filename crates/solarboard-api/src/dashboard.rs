// Dashboard endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Activity, DashboardAnalytics, DashboardCounts};

impl ApiClient {
    /// Headline counters: pending approvals, engineers, shops, ads.
    pub async fn dashboard_counts(&self) -> Result<DashboardCounts, Error> {
        let payload = self
            .get("dashboard/simple-counts", "Failed to fetch dashboard counts")
            .await?;
        Ok(payload.data)
    }

    pub async fn dashboard_analytics(&self) -> Result<DashboardAnalytics, Error> {
        let payload = self
            .get("dashboard/analytics", "Failed to fetch dashboard analytics")
            .await?;
        Ok(payload.data)
    }

    /// Most recent platform activity, newest first as the backend sends it.
    pub async fn recent_activities(&self) -> Result<Vec<Activity>, Error> {
        let payload = self
            .get("dashboard/recent-activities", "Failed to fetch recent activities")
            .await?;
        Ok(payload.data)
    }
}
