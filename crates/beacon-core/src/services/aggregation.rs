//! Time-series aggregation for the analytics dashboards
//!
//! Everything here is pure: vendor clients hand over raw daily values and the
//! services decide which window they belong to.

use crate::types::DateWindow;
use beacon_types::{AnalyticsSummary, DailyValue, DistributionEntry};
use std::collections::BTreeMap;

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Change of `current` relative to `previous`, in percent (one decimal).
///
/// A zero baseline reports 100 when there is any current value and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round1((current - previous) / previous * 100.0)
}

/// Map vendor rows onto every day of `window`; missing days count as 0,
/// duplicate dates are summed and rows outside the window are dropped.
pub fn fill_window(window: &DateWindow, rows: &[DailyValue]) -> Vec<DailyValue> {
    let mut by_date: BTreeMap<_, u64> = BTreeMap::new();
    for row in rows {
        if row.date >= window.start && row.date <= window.end {
            *by_date.entry(row.date).or_default() += row.value;
        }
    }

    window
        .dates()
        .map(|date| DailyValue {
            date,
            value: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Divide an aggregate evenly across the window. The remainder goes to the
/// earliest days so the series still sums to `total`.
pub fn spread_evenly(window: &DateWindow, total: u64) -> Vec<DailyValue> {
    let days = window.days().max(1) as u64;
    let base = total / days;
    let remainder = total % days;

    window
        .dates()
        .enumerate()
        .map(|(index, date)| DailyValue {
            date,
            value: base + u64::from((index as u64) < remainder),
        })
        .collect()
}

/// Summarise a window against the window before it.
///
/// Both series are expected to be filled (one entry per day); `previous` is
/// compared by offset, so the latest day is measured against the last day of
/// the comparison window.
pub fn summarize(
    window: &DateWindow,
    current: Vec<DailyValue>,
    previous: &[DailyValue],
    estimated: bool,
) -> AnalyticsSummary {
    let total: u64 = current.iter().map(|d| d.value).sum();
    let previous_total: u64 = previous.iter().map(|d| d.value).sum();
    let peak = current.iter().map(|d| d.value).max().unwrap_or(0);
    let latest = current.last().map(|d| d.value).unwrap_or(0);

    let comparable = current
        .len()
        .checked_sub(1)
        .and_then(|offset| previous.get(offset))
        .map(|d| d.value)
        .unwrap_or(0);

    let average = if current.is_empty() {
        0.0
    } else {
        total as f64 / current.len() as f64
    };

    AnalyticsSummary {
        start_date: window.start,
        end_date: window.end,
        total_visitors: total,
        average_daily: average,
        peak_visitors: peak,
        latest_visitors: latest,
        percentage_change: percentage_change(latest as f64, comparable as f64),
        previous_total,
        total_change: percentage_change(total as f64, previous_total as f64),
        daily_data: current,
        estimated,
    }
}

/// Turn raw category counts into percentages of their sum, largest first
pub fn distribution_percentages(entries: Vec<(String, f64)>) -> Vec<DistributionEntry> {
    let total: f64 = entries.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut out: Vec<DistributionEntry> = entries
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(label, value)| DistributionEntry {
            percentage: round1(value / total * 100.0),
            label,
            value,
        })
        .collect();

    out.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn window(start: u32, end: u32) -> DateWindow {
        DateWindow::new(date(start), date(end)).unwrap()
    }

    fn series(window: &DateWindow, values: &[u64]) -> Vec<DailyValue> {
        window
            .dates()
            .zip(values)
            .map(|(date, value)| DailyValue { date, value: *value })
            .collect()
    }

    #[test]
    fn average_is_total_over_days() {
        let w = window(1, 7);
        let current = series(&w, &[3, 9, 4, 0, 12, 5, 8]);
        let summary = summarize(&w, current, &series(&w.previous().unwrap(), &[1; 7]), false);

        assert_eq!(summary.total_visitors, 41);
        assert_eq!(summary.average_daily, 41.0 / 7.0);
        assert_eq!(summary.average_daily, summary.total_visitors as f64 / w.days() as f64);
    }

    #[test]
    fn peak_and_latest_come_from_the_current_series() {
        let w = window(1, 4);
        let summary = summarize(&w, series(&w, &[5, 17, 2, 6]), &series(&w.previous().unwrap(), &[0; 4]), false);

        assert_eq!(summary.peak_visitors, 17);
        assert_eq!(summary.latest_visitors, 6);
    }

    #[test]
    fn zero_baseline_with_traffic_reports_one_hundred_percent() {
        let w = window(1, 3);
        let summary = summarize(&w, series(&w, &[1, 1, 4]), &series(&w.previous().unwrap(), &[7, 7, 0]), false);

        assert_eq!(summary.percentage_change, 100.0);
    }

    #[test]
    fn zero_baseline_without_traffic_reports_no_change() {
        assert_eq!(percentage_change(0.0, 0.0), 0.0);

        let w = window(1, 2);
        let summary = summarize(&w, series(&w, &[0, 0]), &series(&w.previous().unwrap(), &[0, 0]), false);
        assert_eq!(summary.percentage_change, 0.0);
        assert_eq!(summary.total_change, 0.0);
    }

    #[test]
    fn change_is_measured_against_the_equivalent_prior_day() {
        let w = window(8, 10);
        let previous = series(&w.previous().unwrap(), &[100, 100, 40]);
        let summary = summarize(&w, series(&w, &[1, 1, 50]), &previous, false);

        assert_eq!(summary.percentage_change, 25.0);
        assert_eq!(summary.total_change, round1((52.0 - 240.0) / 240.0 * 100.0));
    }

    #[test]
    fn percentage_change_rounds_to_one_decimal() {
        assert_eq!(percentage_change(2.0, 3.0), -33.3);
        assert_eq!(percentage_change(10.0, 3.0), 233.3);
    }

    #[test]
    fn fill_window_zero_fills_and_drops_out_of_range_rows() {
        let w = window(1, 4);
        let rows = vec![
            DailyValue { date: date(2), value: 5 },
            DailyValue { date: date(2), value: 1 },
            DailyValue { date: date(9), value: 99 },
        ];

        let filled = fill_window(&w, &rows);
        let values: Vec<u64> = filled.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![0, 6, 0, 0]);
        assert_eq!(filled[0].date, date(1));
    }

    #[test]
    fn spread_evenly_preserves_the_aggregate() {
        let w = window(1, 7);
        let spread = spread_evenly(&w, 30);
        let values: Vec<u64> = spread.iter().map(|d| d.value).collect();

        assert_eq!(values, vec![5, 5, 4, 4, 4, 4, 4]);
        assert_eq!(values.iter().sum::<u64>(), 30);
    }

    #[test]
    fn distribution_is_sorted_and_sums_to_one_hundred() {
        let entries = vec![
            ("Education".to_string(), 25.0),
            ("Nonprofit".to_string(), 50.0),
            ("Health".to_string(), 25.0),
            ("Unknown".to_string(), 0.0),
        ];

        let out = distribution_percentages(entries);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label, "Nonprofit");
        assert_eq!(out[0].percentage, 50.0);
        assert_eq!(out[1].label, "Education");
        assert_eq!(out.iter().map(|e| e.percentage).sum::<f64>(), 100.0);
    }

    #[test]
    fn empty_distribution_yields_no_entries() {
        assert!(distribution_percentages(vec![("A".to_string(), 0.0)]).is_empty());
    }
}
