//! # Revenue Series
//!
//! Groups daily sales into chart points for the dashboard revenue chart.
//!
//! ## Windows
//! ```text
//! ┌──────────┬───────────────────────────────────────────┬──────────────┐
//! │ day      │ last 7 points                             │ J1 .. J7     │
//! │ week     │ 7-day buckets back from the latest date,  │ S1 .. S4     │
//! │          │ at most 4, revenue summed                 │ (S1 oldest)  │
//! │ month    │ every point                               │ YYYY-MM-DD   │
//! │ year     │ last 12 points                            │ M1 .. M12    │
//! └──────────┴───────────────────────────────────────────┴──────────────┘
//! ```
//! Input is sorted by date first. Short histories give fewer points; the
//! series is never padded before the oldest data.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::DailySalesPoint;

const DAY_WINDOW: usize = 7;
const WEEK_WINDOW: usize = 4;
const YEAR_WINDOW: usize = 12;

/// Chart granularity selected in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            other => Err(ValidationError::InvalidFormat {
                field: "granularity".to_string(),
                reason: format!("expected day, week, month or year, got '{}'", other),
            }),
        }
    }
}

/// One point of the revenue chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeriesPoint {
    pub label: String,
    pub revenue: Money,
}

impl SeriesPoint {
    fn new(label: String, revenue: Money) -> Self {
        Self { label, revenue }
    }
}

/// Builds the revenue series for `granularity`.
pub fn build_revenue_series(daily_sales: &[DailySalesPoint], granularity: Granularity) -> Vec<SeriesPoint> {
    let mut points: Vec<&DailySalesPoint> = daily_sales.iter().collect();
    points.sort_by_key(|p| p.sale_date);

    match granularity {
        Granularity::Day => label_last(&points, DAY_WINDOW, "J"),
        Granularity::Week => weekly_buckets(&points),
        Granularity::Month => points
            .iter()
            .map(|p| SeriesPoint::new(p.sale_date.format("%Y-%m-%d").to_string(), p.revenue()))
            .collect(),
        Granularity::Year => label_last(&points, YEAR_WINDOW, "M"),
    }
}

/// Keeps the last `window` points and labels them `{prefix}1..`.
fn label_last(points: &[&DailySalesPoint], window: usize, prefix: &str) -> Vec<SeriesPoint> {
    let start = points.len().saturating_sub(window);
    points[start..]
        .iter()
        .enumerate()
        .map(|(i, p)| SeriesPoint::new(format!("{}{}", prefix, i + 1), p.revenue()))
        .collect()
}

/// Sums revenue into 7-day buckets ending at the latest date.
fn weekly_buckets(points: &[&DailySalesPoint]) -> Vec<SeriesPoint> {
    let Some(latest) = points.last().map(|p| p.sale_date) else {
        return Vec::new();
    };

    // Index 0 is the week ending at `latest`
    let mut buckets = [Money::zero(); WEEK_WINDOW];
    let mut oldest = 0;
    for point in points {
        let index = weeks_before(latest, point.sale_date);
        if index < WEEK_WINDOW {
            buckets[index] += point.revenue();
            oldest = oldest.max(index);
        }
    }

    (0..=oldest)
        .rev()
        .enumerate()
        .map(|(i, index)| SeriesPoint::new(format!("S{}", i + 1), buckets[index]))
        .collect()
}

fn weeks_before(latest: NaiveDate, date: NaiveDate) -> usize {
    ((latest - date).num_days().max(0) / 7) as usize
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn history(start: NaiveDate, revenues: &[i64]) -> Vec<DailySalesPoint> {
        revenues
            .iter()
            .enumerate()
            .map(|(i, cents)| DailySalesPoint {
                sale_date: start + Duration::days(i as i64),
                total_orders: 1,
                revenue_cents: *cents,
                avg_order_value_cents: *cents,
                unique_customers: 1,
            })
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn labels(series: &[SeriesPoint]) -> Vec<&str> {
        series.iter().map(|p| p.label.as_str()).collect()
    }

    #[test]
    fn test_day_keeps_last_seven() {
        let sales = history(day(2025, 1, 1), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let series = build_revenue_series(&sales, Granularity::Day);

        assert_eq!(labels(&series), vec!["J1", "J2", "J3", "J4", "J5", "J6", "J7"]);
        assert_eq!(series[0].revenue.cents(), 4);
        assert_eq!(series[6].revenue.cents(), 10);
    }

    #[test]
    fn test_short_history_is_not_padded() {
        let sales = history(day(2025, 1, 1), &[100, 200, 300]);

        assert_eq!(build_revenue_series(&sales, Granularity::Day).len(), 3);
        assert_eq!(build_revenue_series(&sales, Granularity::Year).len(), 3);
        assert_eq!(build_revenue_series(&sales, Granularity::Week).len(), 1);
        assert!(build_revenue_series(&[], Granularity::Week).is_empty());
        assert!(build_revenue_series(&[], Granularity::Month).is_empty());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut sales = history(day(2025, 1, 1), &[100, 200, 300]);
        sales.reverse();

        let series = build_revenue_series(&sales, Granularity::Month);
        assert_eq!(labels(&series), vec!["2025-01-01", "2025-01-02", "2025-01-03"]);
        assert_eq!(series[2].revenue.cents(), 300);
    }

    #[test]
    fn test_week_buckets_sum_seven_days() {
        // 30 consecutive days of 1.00: buckets of 7 back from the last day
        let sales = history(day(2025, 1, 1), &[100; 30]);
        let series = build_revenue_series(&sales, Granularity::Week);

        assert_eq!(labels(&series), vec!["S1", "S2", "S3", "S4"]);
        for point in &series {
            assert_eq!(point.revenue.cents(), 700);
        }
    }

    #[test]
    fn test_week_keeps_empty_interior_weeks() {
        let sales = vec![
            history(day(2025, 1, 1), &[500]).remove(0),
            history(day(2025, 1, 15), &[300]).remove(0),
        ];
        let series = build_revenue_series(&sales, Granularity::Week);

        // 2025-01-15 is bucket 0, 2025-01-08..14 is empty, 2025-01-01 is bucket 2
        assert_eq!(labels(&series), vec!["S1", "S2", "S3"]);
        assert_eq!(series[0].revenue.cents(), 500);
        assert_eq!(series[1].revenue, Money::zero());
        assert_eq!(series[2].revenue.cents(), 300);
    }

    #[test]
    fn test_year_keeps_last_twelve() {
        let sales = history(day(2024, 1, 1), &(1..=20).collect::<Vec<_>>());
        let series = build_revenue_series(&sales, Granularity::Year);

        assert_eq!(series.len(), 12);
        assert_eq!(series[0].label, "M1");
        assert_eq!(series[0].revenue.cents(), 9);
        assert_eq!(series[11].label, "M12");
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!(" Month ".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("quarter".parse::<Granularity>().is_err());
        assert_eq!(Granularity::Year.to_string(), "year");
    }
}
