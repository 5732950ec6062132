//! Threshold policy and engine configuration
//!
//! Classification bands per metric domain plus the refresh cadence and
//! model settings. Loaded once at startup and immutable process-wide;
//! band ordering is validated before the engine accepts a configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{InsightError, InsightResult};

/// Classification bands for the telework percentage domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleworkThresholds {
    /// Maximum allowed telework percentage; above this is critical
    pub max_percentage: f64,
    /// Warning level
    pub warning_threshold: f64,
    /// Lower bound of the optimal telework range
    pub optimal_low: f64,
    /// Upper bound of the optimal telework range
    pub optimal_high: f64,
}

impl Default for TeleworkThresholds {
    fn default() -> Self {
        Self {
            max_percentage: 60.0,
            warning_threshold: 50.0,
            optimal_low: 20.0,
            optimal_high: 40.0,
        }
    }
}

impl TeleworkThresholds {
    /// Validate band ordering: optimal_low < optimal_high < warning < max
    pub fn validate(&self) -> InsightResult<()> {
        let ordered = self.optimal_low < self.optimal_high
            && self.optimal_high < self.warning_threshold
            && self.warning_threshold < self.max_percentage;
        if !ordered {
            return Err(InsightError::Configuration {
                message: format!(
                    "telework bands not monotonically ordered: optimal ({}, {}), warning {}, max {}",
                    self.optimal_low, self.optimal_high, self.warning_threshold, self.max_percentage
                ),
            });
        }
        Ok(())
    }
}

/// Classification bands for the desk occupancy percentage domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyThresholds {
    /// Critical high occupancy
    pub critical_high: f64,
    /// Warning high occupancy
    pub warning_high: f64,
    /// Lower bound of the optimal occupancy range
    pub optimal_low: f64,
    /// Upper bound of the optimal occupancy range
    pub optimal_high: f64,
    /// Warning low occupancy
    pub warning_low: f64,
    /// Critical low occupancy
    pub critical_low: f64,
}

impl Default for OccupancyThresholds {
    fn default() -> Self {
        Self {
            critical_high: 90.0,
            warning_high: 80.0,
            optimal_low: 70.0,
            optimal_high: 85.0,
            warning_low: 60.0,
            critical_low: 50.0,
        }
    }
}

impl OccupancyThresholds {
    /// Validate band ordering
    ///
    /// The alert ladder only uses the critical/warning bands, so the
    /// optimal range is checked for internal consistency but is allowed
    /// to overlap the warning bands.
    pub fn validate(&self) -> InsightResult<()> {
        let ordered = self.critical_low < self.warning_low
            && self.warning_low < self.warning_high
            && self.warning_high < self.critical_high
            && self.warning_low <= self.optimal_low
            && self.optimal_low < self.optimal_high
            && self.optimal_high <= self.critical_high;
        if !ordered {
            return Err(InsightError::Configuration {
                message: format!(
                    "occupancy bands not monotonically ordered: critical ({}, {}), warning ({}, {}), optimal ({}, {})",
                    self.critical_low,
                    self.critical_high,
                    self.warning_low,
                    self.warning_high,
                    self.optimal_low,
                    self.optimal_high
                ),
            });
        }
        Ok(())
    }
}

/// Forecasting model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default forecast horizon in days
    pub prediction_days: u32,
    /// Minimum confidence for decisions driven by forecasts
    pub confidence_threshold: f64,
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Seed for deterministic fitting
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            prediction_days: 30,
            confidence_threshold: 0.8,
            n_trees: 50,
            max_depth: 6,
            seed: 42,
        }
    }
}

/// Complete engine configuration: policies, model, refresh cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Telework classification bands
    pub telework_thresholds: TeleworkThresholds,
    /// Occupancy classification bands
    pub occupancy_thresholds: OccupancyThresholds,
    /// Forecasting model settings
    pub model: ModelConfig,
    /// Recurring refresh interval
    pub refresh_interval: Duration,
    /// Daily wall-clock refresh hour (UTC)
    pub daily_refresh_hour: u32,
    /// Data collection window for the full analysis, in days
    pub collection_window_days: u32,
    /// Wider collection window used for predictions, in days
    pub prediction_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            telework_thresholds: TeleworkThresholds::default(),
            occupancy_thresholds: OccupancyThresholds::default(),
            model: ModelConfig::default(),
            refresh_interval: Duration::from_secs(6 * 60 * 60),
            daily_refresh_hour: 8,
            collection_window_days: 30,
            prediction_window_days: 60,
        }
    }
}

impl EngineConfig {
    /// Validate thresholds and cadence settings
    pub fn validate(&self) -> InsightResult<()> {
        self.telework_thresholds.validate()?;
        self.occupancy_thresholds.validate()?;
        if self.daily_refresh_hour >= 24 {
            return Err(InsightError::Configuration {
                message: format!("daily refresh hour {} out of range", self.daily_refresh_hour),
            });
        }
        if self.refresh_interval.is_zero() {
            return Err(InsightError::Configuration {
                message: "refresh interval must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_telework_band_ordering_enforced() {
        let thresholds = TeleworkThresholds {
            max_percentage: 40.0,
            warning_threshold: 50.0,
            optimal_low: 20.0,
            optimal_high: 40.0,
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_occupancy_band_ordering_enforced() {
        let thresholds = OccupancyThresholds {
            critical_low: 60.0,
            warning_low: 50.0,
            ..OccupancyThresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_daily_hour_out_of_range() {
        let config = EngineConfig {
            daily_refresh_hour: 24,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
