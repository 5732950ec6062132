//! Telework temporal aggregation
//!
//! Week-to-date and month-to-date averages relative to the analysis day.
//! The two calculations deliberately disagree about missing days: the
//! weekly average only sees days present in the input, while the monthly
//! average treats every calendar day of the month-to-date interval as an
//! observation and counts absent days as 0%.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::series::{round2, MetricSeries};

/// One day's percentage in the report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPercentage {
    /// Calendar day
    pub date: NaiveDate,
    /// Percentage rounded to two decimals
    pub percentage: f64,
}

/// Per-day percentage list for the full input window
pub fn daily_percentages(series: &MetricSeries) -> Vec<DailyPercentage> {
    series
        .points()
        .iter()
        .map(|p| DailyPercentage {
            date: p.date,
            percentage: round2(p.value),
        })
        .collect()
}

/// Week-to-date average over [Monday of `today`'s week, `today`]
///
/// Missing days are simply absent from the average. Returns 0 when no
/// day of the interval is present in the input.
pub fn week_to_date_average(series: &MetricSeries, today: NaiveDate) -> f64 {
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);

    let present: Vec<f64> = series
        .points()
        .iter()
        .filter(|p| p.date >= week_start && p.date <= today)
        .map(|p| p.value)
        .collect();

    if present.is_empty() {
        return 0.0;
    }
    round2(present.iter().sum::<f64>() / present.len() as f64)
}

/// Month-to-date average over [1st of `today`'s month, `today`]
///
/// Every calendar day of the interval counts; days absent from the input
/// contribute 0%. The denominator is therefore the day-of-month of
/// `today`, not the number of observations.
pub fn month_to_date_average(series: &MetricSeries, today: NaiveDate) -> f64 {
    let Some(month_start) = today.with_day(1) else {
        return 0.0;
    };
    let calendar_days = (today - month_start).num_days() + 1;
    if calendar_days <= 0 {
        return 0.0;
    }

    let present_sum: f64 = series
        .points()
        .iter()
        .filter(|p| p.date >= month_start && p.date <= today)
        .map(|p| p.value)
        .sum();

    round2(present_sum / calendar_days as f64)
}
