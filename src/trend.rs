//! Trend classification
//!
//! Compares the mean of the most recent 7 observations against the mean of
//! the 7 observations immediately before them. Pure function of the input
//! series; fewer than 14 observations always classifies as stable.

use serde::{Deserialize, Serialize};

use crate::series::MetricSeries;

/// Relative tolerance for the telework domain (10%)
pub const TELEWORK_TOLERANCE: f64 = 0.10;
/// Relative tolerance for the occupancy domain (5%)
pub const OCCUPANCY_TOLERANCE: f64 = 0.05;

/// Window length for both comparison windows
const WINDOW: usize = 7;

/// Qualitative trend direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Recent window above previous window beyond tolerance
    Increasing,
    /// Recent window below previous window beyond tolerance
    Decreasing,
    /// Within tolerance, or insufficient history
    Stable,
}

/// Trend decision together with the two window means that produced it
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrendResult {
    /// Classified direction
    pub trend: Trend,
    /// Mean of the most recent 7 observations
    pub recent_mean: f64,
    /// Mean of the 7 observations before those
    pub previous_mean: f64,
}

impl TrendResult {
    /// Result for series too short to classify
    pub fn insufficient() -> Self {
        Self {
            trend: Trend::Stable,
            recent_mean: 0.0,
            previous_mean: 0.0,
        }
    }
}

/// Classify the trend of a series with the given relative tolerance
///
/// Only the most recent 14 observations participate; older history never
/// changes the result.
pub fn classify(series: &MetricSeries, tolerance: f64) -> TrendResult {
    let (Some(recent), Some(previous)) =
        (series.window_mean(0, WINDOW), series.window_mean(WINDOW, WINDOW))
    else {
        return TrendResult::insufficient();
    };

    let trend = if recent > previous * (1.0 + tolerance) {
        Trend::Increasing
    } else if recent < previous * (1.0 - tolerance) {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    TrendResult {
        trend,
        recent_mean: recent,
        previous_mean: previous,
    }
}
