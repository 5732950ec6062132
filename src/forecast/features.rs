//! Feature construction for the forecaster
//!
//! Each observation is described by three calendar features (day-of-week,
//! month, day-of-year) and two lag features (the value 1 and 7 positions
//! earlier in the series). Lag features are undefined for the first 7
//! observations, which are dropped from the training set.

use chrono::{Datelike, NaiveDate};

use crate::series::MetricSeries;

/// Number of features per row
pub const FEATURE_COUNT: usize = 5;

/// Positions skipped at the start of the series because their lag-7
/// feature is undefined
pub const LAG_WINDOW: usize = 7;

/// Calendar-derived features for a date
pub fn calendar_features(date: NaiveDate) -> [f64; 3] {
    [
        date.weekday().num_days_from_monday() as f64,
        date.month() as f64,
        date.ordinal() as f64,
    ]
}

/// Assemble a full feature row from calendar features and lag values
pub fn feature_row(date: NaiveDate, lag_1: f64, lag_7: f64) -> Vec<f64> {
    let [dow, month, doy] = calendar_features(date);
    vec![dow, month, doy, lag_1, lag_7]
}

/// Build the training matrix and target vector from a series
///
/// Lags are positional, matching the day-granularity of the input. The
/// first `LAG_WINDOW` observations are dropped.
pub fn build_training(series: &MetricSeries) -> (Vec<Vec<f64>>, Vec<f64>) {
    let points = series.points();
    if points.len() <= LAG_WINDOW {
        return (Vec::new(), Vec::new());
    }

    let mut rows = Vec::with_capacity(points.len() - LAG_WINDOW);
    let mut targets = Vec::with_capacity(points.len() - LAG_WINDOW);

    for i in LAG_WINDOW..points.len() {
        let lag_1 = points[i - 1].value;
        let lag_7 = points[i - LAG_WINDOW].value;
        rows.push(feature_row(points[i].date, lag_1, lag_7));
        targets.push(points[i].value);
    }

    (rows, targets)
}
