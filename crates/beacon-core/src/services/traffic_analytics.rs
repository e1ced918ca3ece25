//! Website visitor summary

use crate::error::Result;
use crate::services::aggregation::{fill_window, spread_evenly, summarize};
use crate::services::traits::TrafficSource;
use crate::types::DateWindow;
use beacon_types::{AnalyticsSummary, DailyValue, DateRangeRequest};
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

pub struct TrafficAnalytics {
    source: Arc<dyn TrafficSource>,
}

impl TrafficAnalytics {
    pub fn new(source: Arc<dyn TrafficSource>) -> Self {
        Self { source }
    }

    /// Daily active users for the requested window, compared against the
    /// window of equal length just before it.
    pub async fn summarize(&self, request: &DateRangeRequest, today: NaiveDate) -> Result<AnalyticsSummary> {
        let window = DateWindow::resolve(request, today)?;
        let previous_window = window.previous()?;
        info!(
            "Fetching traffic for {}..{} (compared with {}..{})",
            window.start, window.end, previous_window.start, previous_window.end
        );

        let (current, estimated) = self.series(&window).await?;
        let (previous, _) = self.series(&previous_window).await?;

        Ok(summarize(&window, current, &previous, estimated))
    }

    /// Filled daily series; falls back to spreading the aggregate when the
    /// per-day report comes back empty.
    async fn series(&self, window: &DateWindow) -> Result<(Vec<DailyValue>, bool)> {
        let rows = self.source.daily_active_users(window).await?;
        if !rows.is_empty() {
            return Ok((fill_window(window, &rows), false));
        }

        let total = self.source.total_users(window).await?;
        warn!(
            "No daily rows for {}..{}, spreading {} total users evenly",
            window.start, window.end, total
        );
        Ok((spread_evenly(window, total), true))
    }
}
