//! Google Analytics Data API (GA4) client

use super::google_oauth::GoogleTokenProvider;
use super::http::{build_http_client, check_response};
use crate::config::GoogleAnalyticsConfig;
use crate::error::{BeaconError, Result};
use crate::services::traits::TrafficSource;
use crate::types::DateWindow;
use async_trait::async_trait;
use beacon_types::DailyValue;
use chrono::NaiveDate;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use std::sync::Arc;

const SERVICE: &str = "Google Analytics";

pub struct GoogleAnalyticsClient {
    config: GoogleAnalyticsConfig,
    tokens: Arc<GoogleTokenProvider>,
    http_client: HttpClient,
}

impl GoogleAnalyticsClient {
    pub fn new(config: GoogleAnalyticsConfig, tokens: Arc<GoogleTokenProvider>) -> Result<Self> {
        Ok(Self {
            config,
            tokens,
            http_client: build_http_client()?,
        })
    }

    async fn run_report(&self, body: Value) -> Result<Value> {
        let access_token = self.tokens.access_token(&self.config.refresh_token).await?;
        let url = format!(
            "{}/properties/{}:runReport",
            self.config.base_url, self.config.property_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        Ok(check_response(SERVICE, response).await?.json().await?)
    }
}

#[async_trait]
impl TrafficSource for GoogleAnalyticsClient {
    async fn daily_active_users(&self, window: &DateWindow) -> Result<Vec<DailyValue>> {
        let report = self.run_report(daily_report_body(window)).await?;
        let rows = parse_daily_rows(&report)?;
        log::info!(
            "Google Analytics returned {} daily rows for {}..{}",
            rows.len(),
            window.start,
            window.end
        );
        Ok(rows)
    }

    async fn total_users(&self, window: &DateWindow) -> Result<u64> {
        let report = self.run_report(total_report_body(window)).await?;
        parse_total(&report)
    }
}

fn date_ranges(window: &DateWindow) -> Value {
    json!([{
        "startDate": window.start.format("%Y-%m-%d").to_string(),
        "endDate": window.end.format("%Y-%m-%d").to_string(),
    }])
}

fn daily_report_body(window: &DateWindow) -> Value {
    json!({
        "dateRanges": date_ranges(window),
        "dimensions": [{"name": "date"}],
        "metrics": [{"name": "activeUsers"}],
        "orderBys": [{"dimension": {"dimensionName": "date"}}],
    })
}

fn total_report_body(window: &DateWindow) -> Value {
    json!({
        "dateRanges": date_ranges(window),
        "metrics": [{"name": "totalUsers"}],
    })
}

/// Rows keyed by the `date` dimension (`YYYYMMDD`); a report without rows is empty
fn parse_daily_rows(report: &Value) -> Result<Vec<DailyValue>> {
    let rows = match report["rows"].as_array() {
        Some(rows) => rows,
        None => return Ok(Vec::new()),
    };

    rows.iter()
        .map(|row| {
            let raw_date = row["dimensionValues"][0]["value"]
                .as_str()
                .ok_or_else(|| BeaconError::unexpected(SERVICE, "row without a date dimension"))?;
            let date = NaiveDate::parse_from_str(raw_date, "%Y%m%d").map_err(|e| {
                BeaconError::unexpected(SERVICE, format!("invalid date '{}': {}", raw_date, e))
            })?;
            Ok(DailyValue {
                date,
                value: metric_value(&row["metricValues"][0])?,
            })
        })
        .collect()
}

fn parse_total(report: &Value) -> Result<u64> {
    match report["rows"].as_array().and_then(|rows| rows.first()) {
        Some(row) => metric_value(&row["metricValues"][0]),
        None => Ok(0),
    }
}

/// Metric values arrive as decimal strings
fn metric_value(value: &Value) -> Result<u64> {
    let raw = value["value"]
        .as_str()
        .ok_or_else(|| BeaconError::unexpected(SERVICE, "row without a metric value"))?;
    raw.parse::<u64>()
        .map_err(|e| BeaconError::unexpected(SERVICE, format!("invalid metric value '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 7).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn daily_rows_parse_compact_dates() {
        let report = json!({
            "dimensionHeaders": [{"name": "date"}],
            "metricHeaders": [{"name": "activeUsers", "type": "TYPE_INTEGER"}],
            "rows": [
                {"dimensionValues": [{"value": "20240401"}], "metricValues": [{"value": "42"}]},
                {"dimensionValues": [{"value": "20240403"}], "metricValues": [{"value": "17"}]}
            ],
            "rowCount": 2
        });

        let rows = parse_daily_rows(&report).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
        assert_eq!(rows[1].value, 17);
    }

    #[test]
    fn report_without_rows_is_empty() {
        let report = json!({"metricHeaders": [{"name": "activeUsers"}], "kind": "analyticsData#runReport"});
        assert!(parse_daily_rows(&report).unwrap().is_empty());
        assert_eq!(parse_total(&report).unwrap(), 0);
    }

    #[test]
    fn total_reads_the_single_aggregate_row() {
        let report = json!({"rows": [{"metricValues": [{"value": "318"}]}]});
        assert_eq!(parse_total(&report).unwrap(), 318);
    }

    #[test]
    fn malformed_values_are_unexpected_responses() {
        let report = json!({"rows": [{"dimensionValues": [{"value": "2024-04-01"}], "metricValues": [{"value": "1"}]}]});
        assert!(matches!(
            parse_daily_rows(&report),
            Err(BeaconError::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn request_bodies_use_iso_dates() {
        let body = daily_report_body(&window());
        assert_eq!(body["dateRanges"][0]["startDate"], "2024-04-01");
        assert_eq!(body["dimensions"][0]["name"], "date");
        assert_eq!(total_report_body(&window())["metrics"][0]["name"], "totalUsers");
    }
}
