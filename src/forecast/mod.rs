//! Short-horizon metric forecasting
//!
//! Fits a random-forest regressor over calendar and lag features, then
//! projects the metric forward day by day. Future rows are predicted
//! recursively: each prediction becomes the lag-1 input of the next row
//! (and the lag-7 input seven rows later), so fitting and inference share
//! one feature schema.
//!
//! The reported confidence is the model's coefficient of determination on
//! its own training rows: a heuristic for fit quality, not a predictive
//! bound.

mod features;
mod forest;

pub use forest::RandomForestRegressor;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::series::{round2, round3, MetricSeries};
use features::{build_training, feature_row, LAG_WINDOW};

/// Minimum raw observations before feature construction
const MIN_RAW_ROWS: usize = 14;
/// Minimum training rows after dropping undefined-lag observations
const MIN_TRAINING_ROWS: usize = 10;

/// One forecasted day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedPoint {
    /// Forecasted calendar day
    pub date: NaiveDate,
    /// Predicted metric value, rounded to two decimals
    pub predicted_value: f64,
}

/// Forecast output: ordered predictions plus in-sample fit quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Predicted values, one per day of the horizon
    pub predictions: Vec<PredictedPoint>,
    /// In-sample R², clamped to [0, 1]
    pub confidence: f64,
}

impl ForecastResult {
    /// The defined default for insufficient input
    pub fn empty() -> Self {
        Self {
            predictions: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Metric forecaster
#[derive(Debug, Clone)]
pub struct Forecaster {
    config: ModelConfig,
}

impl Forecaster {
    /// Create a forecaster with the given model settings
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Forecast a series `horizon_days` forward
    ///
    /// Input below the minimum size yields an empty forecast with
    /// confidence 0. That is a defined default, not an error.
    pub fn forecast(&self, series: &MetricSeries, horizon_days: u32) -> ForecastResult {
        if series.len() < MIN_RAW_ROWS {
            debug!(
                rows = series.len(),
                "series below minimum for forecasting, returning empty forecast"
            );
            return ForecastResult::empty();
        }

        let (rows, targets) = build_training(series);
        if rows.len() < MIN_TRAINING_ROWS {
            debug!(
                training_rows = rows.len(),
                "too few training rows after lag construction, returning empty forecast"
            );
            return ForecastResult::empty();
        }

        let mut forest = RandomForestRegressor::new(
            self.config.n_trees,
            self.config.max_depth,
            self.config.seed,
        );
        forest.fit(&rows, &targets);
        if !forest.is_fitted() {
            warn!("model fitting produced no trees, returning empty forecast");
            return ForecastResult::empty();
        }

        let confidence = forest.r_squared(&rows, &targets).clamp(0.0, 1.0);

        let Some(last_date) = series.last_date() else {
            return ForecastResult::empty();
        };

        // Roll the observed history forward, feeding each prediction back
        // in as a lag value for the rows after it.
        let mut history = series.values();
        let mut predictions = Vec::with_capacity(horizon_days as usize);

        for step in 1..=horizon_days as i64 {
            let date = last_date + Duration::days(step);
            let lag_1 = history[history.len() - 1];
            let lag_7 = history[history.len() - LAG_WINDOW];
            let predicted = forest.predict(&feature_row(date, lag_1, lag_7));
            history.push(predicted);
            predictions.push(PredictedPoint {
                date,
                predicted_value: round2(predicted),
            });
        }

        ForecastResult {
            predictions,
            confidence: round3(confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::MetricPoint;

    fn series(values: &[f64]) -> MetricSeries {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
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

    fn forecaster() -> Forecaster {
        Forecaster::new(ModelConfig::default())
    }

    #[test]
    fn test_empty_series_yields_empty_forecast() {
        let result = forecaster().forecast(&MetricSeries::empty(), 30);
        assert!(result.predictions.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_below_raw_minimum_yields_empty_forecast() {
        let result = forecaster().forecast(&series(&[50.0; 13]), 30);
        assert!(result.predictions.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_below_training_minimum_yields_empty_forecast() {
        // 16 raw rows leave only 9 after dropping the lag window.
        let values: Vec<f64> = (0..16).map(|i| 40.0 + i as f64).collect();
        let result = forecaster().forecast(&series(&values), 30);
        assert!(result.predictions.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_forecast_covers_full_horizon() {
        let values: Vec<f64> = (0..30).map(|i| 50.0 + ((i % 7) as f64) * 3.0).collect();
        let s = series(&values);
        let result = forecaster().forecast(&s, 30);

        assert_eq!(result.predictions.len(), 30);
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);

        // Consecutive dates starting the day after the last observation.
        let last = s.last_date().unwrap();
        for (i, p) in result.predictions.iter().enumerate() {
            assert_eq!(p.date, last + chrono::Duration::days(i as i64 + 1));
        }
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let values: Vec<f64> = (0..40).map(|i| 55.0 + ((i % 5) as f64) * 2.0).collect();
        let s = series(&values);
        let a = forecaster().forecast(&s, 14);
        let b = forecaster().forecast(&s, 14);
        assert_eq!(a.confidence, b.confidence);
        for (pa, pb) in a.predictions.iter().zip(&b.predictions) {
            assert_eq!(pa.predicted_value, pb.predicted_value);
        }
    }

    #[test]
    fn test_predictions_stay_in_training_range() {
        let values: Vec<f64> = (0..30).map(|i| 40.0 + ((i % 7) as f64) * 4.0).collect();
        let result = forecaster().forecast(&series(&values), 30);
        for p in &result.predictions {
            assert!(
                p.predicted_value >= 40.0 && p.predicted_value <= 64.0,
                "prediction {} outside training range",
                p.predicted_value
            );
        }
    }
}
