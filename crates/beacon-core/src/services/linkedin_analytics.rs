//! LinkedIn page statistics: one metric over time plus follower breakdowns

use crate::error::Result;
use crate::services::aggregation::{distribution_percentages, fill_window, summarize};
use crate::services::traits::SocialSource;
use crate::types::{DateWindow, DistributionDimension};
use beacon_types::{LinkedInAnalytics, LinkedInAnalyticsRequest};
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

pub struct LinkedInAnalyticsService {
    source: Arc<dyn SocialSource>,
}

impl LinkedInAnalyticsService {
    pub fn new(source: Arc<dyn SocialSource>) -> Self {
        Self { source }
    }

    pub async fn summarize(&self, request: &LinkedInAnalyticsRequest, today: NaiveDate) -> Result<LinkedInAnalytics> {
        let window = DateWindow::resolve(&request.range, today)?;
        let previous_window = window.previous()?;
        info!(
            "Fetching LinkedIn {} for {}..{}",
            request.metric.metricool_name(),
            window.start,
            window.end
        );

        let current = self.source.timeline(request.metric, &window).await?;
        let previous = self.source.timeline(request.metric, &previous_window).await?;
        let summary = summarize(
            &window,
            fill_window(&window, &current),
            &fill_window(&previous_window, &previous),
            false,
        );

        let industries = self
            .source
            .distribution(DistributionDimension::Industry, &window)
            .await?;
        let functions = self
            .source
            .distribution(DistributionDimension::Function, &window)
            .await?;

        Ok(LinkedInAnalytics {
            metric: request.metric,
            summary,
            industries: distribution_percentages(industries),
            functions: distribution_percentages(functions),
        })
    }
}
