//! Metricool API client for LinkedIn page statistics

use super::http::{build_http_client, check_response};
use crate::config::MetricoolConfig;
use crate::error::{BeaconError, Result};
use crate::services::traits::SocialSource;
use crate::types::{DateWindow, DistributionDimension};
use async_trait::async_trait;
use beacon_types::{DailyValue, LinkedInMetric};
use chrono::NaiveDate;
use reqwest::Client as HttpClient;
use serde_json::Value;

const SERVICE: &str = "Metricool";
const NETWORK: &str = "linkedin";

pub struct MetricoolClient {
    config: MetricoolConfig,
    http_client: HttpClient,
}

impl MetricoolClient {
    pub fn new(config: MetricoolConfig) -> Result<Self> {
        Ok(Self {
            config,
            http_client: build_http_client()?,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/analytics/{}", self.config.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .header("X-Mc-Auth", &self.config.user_token)
            .query(&[
                ("userId", self.config.user_id.as_str()),
                ("blogId", self.config.blog_id.as_str()),
                ("network", NETWORK),
                ("timezone", "UTC"),
            ])
            .query(params)
            .send()
            .await?;

        Ok(check_response(SERVICE, response).await?.json().await?)
    }
}

fn range_params(window: &DateWindow) -> [(&'static str, String); 2] {
    [
        ("from", format!("{}T00:00:00", window.start.format("%Y-%m-%d"))),
        ("to", format!("{}T23:59:59", window.end.format("%Y-%m-%d"))),
    ]
}

#[async_trait]
impl SocialSource for MetricoolClient {
    async fn timeline(&self, metric: LinkedInMetric, window: &DateWindow) -> Result<Vec<DailyValue>> {
        let mut params = range_params(window).to_vec();
        params.push(("metric", metric.metricool_name().to_string()));
        params.push(("subject", "account".to_string()));

        let data = self.get("timelines", &params).await?;
        let values = parse_timeline(&data)?;
        log::info!(
            "Metricool returned {} {} points for {}..{}",
            values.len(),
            metric.metricool_name(),
            window.start,
            window.end
        );
        Ok(values)
    }

    async fn distribution(
        &self,
        dimension: DistributionDimension,
        window: &DateWindow,
    ) -> Result<Vec<(String, f64)>> {
        let mut params = range_params(window).to_vec();
        params.push(("metric", dimension.metricool_name().to_string()));
        params.push(("subject", "followers".to_string()));

        let data = self.get("distribution", &params).await?;
        parse_distribution(&data)
    }
}

/// `data[0].values[]` of `{dateTime, value}`; the date is the leading
/// `YYYY-MM-DD` of the timestamp.
fn parse_timeline(data: &Value) -> Result<Vec<DailyValue>> {
    let values = match data["data"][0]["values"].as_array() {
        Some(values) => values,
        None => return Ok(Vec::new()),
    };

    values
        .iter()
        .map(|point| {
            let stamp = point["dateTime"]
                .as_str()
                .ok_or_else(|| BeaconError::unexpected(SERVICE, "timeline point without dateTime"))?;
            let date = stamp
                .get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
                .ok_or_else(|| BeaconError::unexpected(SERVICE, format!("invalid dateTime '{}'", stamp)))?;
            let value = point["value"].as_f64().unwrap_or(0.0).max(0.0).round() as u64;
            Ok(DailyValue { date, value })
        })
        .collect()
}

/// `data[]` of `{key, value}` pairs
fn parse_distribution(data: &Value) -> Result<Vec<(String, f64)>> {
    let entries = data["data"]
        .as_array()
        .ok_or_else(|| BeaconError::unexpected(SERVICE, "distribution response has no data array"))?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let label = entry["key"].as_str().or_else(|| entry["label"].as_str())?;
            Some((label.to_string(), entry["value"].as_f64().unwrap_or(0.0)))
        })
        .collect())
}
