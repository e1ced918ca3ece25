//! Common types used by the analytics clients and services

use crate::error::{BeaconError, Result};
use beacon_types::{DateRangeKind, DateRangeRequest};
use chrono::{Duration, NaiveDate};

/// Longest custom range the dashboard may request
pub const MAX_CUSTOM_RANGE_DAYS: i64 = 366;

/// Inclusive run of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(BeaconError::Validation(format!(
                "startDate {} is after endDate {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending on `end`
    pub fn ending_on(end: NaiveDate, days: i64) -> Result<Self> {
        let start = end
            .checked_sub_signed(Duration::days(days.max(1) - 1))
            .ok_or_else(|| out_of_range(end))?;
        Ok(Self { start, end })
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Window of the same length immediately before this one
    pub fn previous(&self) -> Result<Self> {
        let end = self.start.pred_opt().ok_or_else(|| out_of_range(self.start))?;
        Self::ending_on(end, self.days())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.days()).map(move |offset| start + Duration::days(offset))
    }

    /// Resolve a dashboard range selection into the current window
    pub fn resolve(request: &DateRangeRequest, today: NaiveDate) -> Result<Self> {
        if let Some(days) = request.date_range.preset_days() {
            return Self::ending_on(today, days);
        }

        debug_assert_eq!(request.date_range, DateRangeKind::Custom);
        let (start, end) = match (request.start_date, request.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(BeaconError::Validation(
                    "custom range requires startDate and endDate".to_string(),
                ))
            }
        };

        let window = Self::new(start, end)?;
        if window.days() > MAX_CUSTOM_RANGE_DAYS {
            return Err(BeaconError::Validation(format!(
                "custom range may span at most {} days",
                MAX_CUSTOM_RANGE_DAYS
            )));
        }
        // The comparison window must be representable too
        window.previous()?;
        Ok(window)
    }
}

fn out_of_range(date: NaiveDate) -> BeaconError {
    BeaconError::Validation(format!("date {} is out of range", date))
}

/// Follower breakdowns offered by Metricool for LinkedIn pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionDimension {
    Industry,
    Function,
}

impl DistributionDimension {
    pub fn metricool_name(&self) -> &'static str {
        match self {
            DistributionDimension::Industry => "industry",
            DistributionDimension::Function => "function",
        }
    }
}
