//! Daily metric series
//!
//! The elementary data structure of the engine: an ordered-by-date sequence
//! of per-day numeric observations. Series are constructed fresh on every
//! analysis cycle and are immutable once handed to the engine; derived
//! values are always new allocations, never in-place edits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statistical::mean;

use crate::error::{InsightError, InsightResult};

/// A single dated observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Observed value (a percentage or rate once handed to the engine)
    pub value: f64,
}

/// Ordered sequence of daily observations for one measured quantity
///
/// Invariant: dates are strictly increasing, one entry per day at most.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSeries {
    points: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Create an empty series
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a series from dated points, validating the ordering invariant
    pub fn from_points(points: Vec<MetricPoint>) -> InsightResult<Self> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(InsightError::InvalidSeries {
                    reason: format!(
                        "dates not strictly increasing: {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no observations
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All observations in date order
    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    /// Observed values in date order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Most recent observed value, or 0.0 for an empty series
    pub fn current_value(&self) -> f64 {
        self.points.last().map(|p| p.value).unwrap_or(0.0)
    }

    /// Date of the most recent observation
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Mean of all observed values, or 0.0 for an empty series
    pub fn mean_value(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        mean(&self.values())
    }

    /// Mean of a window of `len` entries ending `skip_from_end` entries
    /// before the last one
    ///
    /// `window_mean(0, 7)` is the mean of the most recent 7 entries;
    /// `window_mean(7, 7)` the mean of the 7 entries before those.
    /// Returns `None` when the series is too short for the window.
    pub fn window_mean(&self, skip_from_end: usize, len: usize) -> Option<f64> {
        let n = self.points.len();
        if len == 0 || n < skip_from_end + len {
            return None;
        }
        let end = n - skip_from_end;
        let window: Vec<f64> = self.points[end - len..end].iter().map(|p| p.value).collect();
        Some(mean(&window))
    }
}

/// Round to two decimal places, the precision used in report payloads
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to three decimal places, used for confidence scores
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(start: NaiveDate, values: &[f64]) -> MetricSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| MetricPoint {
                date: start + chrono::Duration::days(i as i64),
                value,
            })
            .collect();
        MetricSeries::from_points(points).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let d = date(2024, 5, 1);
        let result = MetricSeries::from_points(vec![
            MetricPoint { date: d, value: 1.0 },
            MetricPoint { date: d, value: 2.0 },
        ]);
        assert!(matches!(result, Err(InsightError::InvalidSeries { .. })));
    }

    #[test]
    fn test_rejects_out_of_order_dates() {
        let result = MetricSeries::from_points(vec![
            MetricPoint {
                date: date(2024, 5, 2),
                value: 1.0,
            },
            MetricPoint {
                date: date(2024, 5, 1),
                value: 2.0,
            },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_current_value_empty_is_zero() {
        assert_eq!(MetricSeries::empty().current_value(), 0.0);
    }

    #[test]
    fn test_current_value_is_last_entry() {
        let s = series(date(2024, 5, 1), &[10.0, 20.0, 30.0]);
        assert_eq!(s.current_value(), 30.0);
    }

    #[test]
    fn test_window_mean_recent_and_previous() {
        let values: Vec<f64> = (1..=14).map(|v| v as f64).collect();
        let s = series(date(2024, 5, 1), &values);

        // Most recent 7: 8..=14, mean 11; previous 7: 1..=7, mean 4.
        assert_eq!(s.window_mean(0, 7), Some(11.0));
        assert_eq!(s.window_mean(7, 7), Some(4.0));
        assert_eq!(s.window_mean(14, 7), None);
    }

    #[test]
    fn test_window_mean_too_short() {
        let s = series(date(2024, 5, 1), &[1.0, 2.0, 3.0]);
        assert_eq!(s.window_mean(0, 7), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.3333), 33.33);
        assert_eq!(round2(66.666), 66.67);
    }
}
