//! Analytics request and summary shapes shared by the dashboard routes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date range selector sent by the dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DateRangeKind {
    #[serde(rename = "7days")]
    SevenDays,
    #[default]
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "60days")]
    SixtyDays,
    #[serde(rename = "90days")]
    NinetyDays,
    #[serde(rename = "custom")]
    Custom,
}

impl DateRangeKind {
    /// Number of days covered by a preset; `None` for custom ranges
    pub fn preset_days(&self) -> Option<i64> {
        match self {
            DateRangeKind::SevenDays => Some(7),
            DateRangeKind::ThirtyDays => Some(30),
            DateRangeKind::SixtyDays => Some(60),
            DateRangeKind::NinetyDays => Some(90),
            DateRangeKind::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeRequest {
    #[serde(default)]
    pub date_range: DateRangeKind,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: u64,
}

/// Totals and comparisons computed over one window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_visitors: u64,
    pub average_daily: f64,
    pub peak_visitors: u64,
    pub latest_visitors: u64,
    pub percentage_change: f64,
    pub previous_total: u64,
    pub total_change: f64,
    pub daily_data: Vec<DailyValue>,
    /// Daily values were spread from an aggregate because the vendor returned no rows
    pub estimated: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkedInMetric {
    #[default]
    Followers,
    Impressions,
    Clicks,
    Engagement,
}

impl LinkedInMetric {
    /// Metric name on the Metricool timelines endpoint
    pub fn metricool_name(&self) -> &'static str {
        match self {
            LinkedInMetric::Followers => "followers",
            LinkedInMetric::Impressions => "impressions",
            LinkedInMetric::Clicks => "clicks",
            LinkedInMetric::Engagement => "engagement",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInAnalyticsRequest {
    #[serde(flatten)]
    pub range: DateRangeRequest,
    #[serde(default)]
    pub metric: LinkedInMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInAnalytics {
    pub metric: LinkedInMetric,
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
    pub industries: Vec<DistributionEntry>,
    pub functions: Vec<DistributionEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_parse_from_dashboard_strings() {
        let req: DateRangeRequest = serde_json::from_str(r#"{"dateRange": "90days"}"#).unwrap();
        assert_eq!(req.date_range, DateRangeKind::NinetyDays);
        assert_eq!(req.date_range.preset_days(), Some(90));
    }

    #[test]
    fn missing_range_defaults_to_thirty_days() {
        let req: DateRangeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.date_range, DateRangeKind::ThirtyDays);
    }

    #[test]
    fn linkedin_request_flattens_range_fields() {
        let req: LinkedInAnalyticsRequest = serde_json::from_str(
            r#"{"dateRange": "custom", "startDate": "2024-01-01", "endDate": "2024-01-14", "metric": "impressions"}"#,
        )
        .unwrap();

        assert_eq!(req.range.date_range, DateRangeKind::Custom);
        assert_eq!(req.range.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(req.metric, LinkedInMetric::Impressions);
    }
}
