//! Anomalous-day detection
//!
//! Unsupervised one-dimensional outlier flagging over a daily series.
//! Roughly 10% of days are expected to be anomalous, so the detector
//! flags the observations whose absolute z-score falls in the top decile
//! of the series' own score distribution.

use chrono::NaiveDate;
use statistical::{mean, standard_deviation};
use tracing::debug;

use crate::series::MetricSeries;

/// Expected share of anomalous days
const CONTAMINATION: f64 = 0.10;

/// Flag statistically unusual days in a series
///
/// Returns the flagged dates in input order. An empty or degenerate
/// series (fewer than two observations, or zero variance) yields an
/// empty set, never an error.
pub fn detect(series: &MetricSeries) -> Vec<NaiveDate> {
    if series.len() < 2 {
        return Vec::new();
    }

    let values = series.values();
    let avg = mean(&values);
    let std_dev = standard_deviation(&values, Some(avg));
    if std_dev <= f64::EPSILON {
        return Vec::new();
    }

    let scores: Vec<f64> = values.iter().map(|v| ((v - avg) / std_dev).abs()).collect();

    // Threshold at the (1 - contamination) quantile of the score
    // distribution, so about 10% of days exceed it.
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let quantile_index =
        (((sorted.len() as f64) * (1.0 - CONTAMINATION)).floor() as usize).min(sorted.len() - 1);
    let threshold = sorted[quantile_index];

    let flagged: Vec<NaiveDate> = series
        .points()
        .iter()
        .zip(&scores)
        .filter(|(_, &score)| score >= threshold && score > f64::EPSILON)
        .map(|(p, _)| p.date)
        .collect();

    if !flagged.is_empty() {
        debug!(count = flagged.len(), "flagged anomalous days");
    }

    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::MetricPoint;

    fn series(values: &[f64]) -> MetricSeries {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        MetricSeries::from_points(
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| MetricPoint {
                    date: start + chrono::Duration::days(i as i64),
                    value,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_series_yields_empty_set() {
        assert!(detect(&MetricSeries::empty()).is_empty());
    }

    #[test]
    fn test_constant_series_yields_empty_set() {
        assert!(detect(&series(&[50.0; 20])).is_empty());
    }

    #[test]
    fn test_single_spike_is_flagged() {
        let mut values = vec![50.0; 19];
        values[9] = 95.0;
        values[18] = 50.5; // slight jitter so variance is not dominated by one point
        let flagged = detect(&series(&values));
        let spike_date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert!(flagged.contains(&spike_date));
    }

    #[test]
    fn test_flagged_share_is_roughly_contamination() {
        // Smooth series with two injected spikes over 30 days.
        let mut values: Vec<f64> = (0..30).map(|i| 60.0 + (i as f64 * 0.3)).collect();
        values[5] = 95.0;
        values[20] = 20.0;
        let flagged = detect(&series(&values));
        assert!(!flagged.is_empty());
        assert!(flagged.len() <= 4, "flagged {} of 30 days", flagged.len());
    }

    #[test]
    fn test_output_preserves_input_order() {
        let mut values: Vec<f64> = (0..30).map(|i| 60.0 + (i as f64 * 0.2)).collect();
        values[25] = 10.0;
        values[3] = 99.0;
        let flagged = detect(&series(&values));
        let mut ordered = flagged.clone();
        ordered.sort();
        assert_eq!(flagged, ordered);
    }
}
