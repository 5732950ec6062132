//! Decision analysis engine for workplace occupancy and telework metrics
//!
//! This crate turns daily occupancy/telework series into a decision report:
//! - Trend classification over recent windows
//! - Threshold-triggered alerts, warnings, and recommendations
//! - Workstation count adjustment policy
//! - Short-horizon forecasting with a fit-quality confidence score
//! - Anomalous-day detection
//! - A periodically refreshed report cache with staleness reporting

#![warn(missing_docs)]

pub mod advisor;
pub mod anomaly;
pub mod collector;
pub mod config;
pub mod error;
pub mod forecast;
pub mod report;
pub mod series;
pub mod service;
pub mod temporal;
pub mod trend;

pub use error::{InsightError, InsightResult};

// Metric series
pub use series::{MetricPoint, MetricSeries};

// Configuration
pub use config::{EngineConfig, ModelConfig, OccupancyThresholds, TeleworkThresholds};

// Trend classification
pub use trend::{Trend, TrendResult, OCCUPANCY_TOLERANCE, TELEWORK_TOLERANCE};

// Alerts and recommendations
pub use advisor::{
    AdjustmentDirection, AdjustmentPriority, Finding, Severity, ThresholdFindings,
    WorkstationAdjustment,
};

// Temporal aggregation
pub use temporal::DailyPercentage;

// Forecasting
pub use forecast::{ForecastResult, Forecaster, PredictedPoint};

// Report assembly
pub use report::{
    AnalysisReport, DomainAnomalies, DomainForecasts, OccupancyAnalysis, PriorityAction,
    ReportAssembler, ReportSummary, TeleworkAnalysis,
};

// Data boundary
pub use collector::{
    AnalysisDataset, DailyCount, DataProvider, DatasetBuilder, RealtimeAnalysis, RealtimeSnapshot,
    RealtimeStatus,
};

// Service
pub use service::{InsightService, ReportHandle, ServiceMetrics};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_component_creation() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());

        let _assembler = ReportAssembler::new(config.clone());
        let _forecaster = Forecaster::new(config.model);
    }

    #[test]
    fn test_module_re_exports() {
        let _trend = Trend::Stable;
        let _severity = Severity::Critical;
        let _direction = AdjustmentDirection::Add;
        let _priority = AdjustmentPriority::High;
        let _status = RealtimeStatus::Normal;

        let _series = MetricSeries::empty();
        let _dataset = AnalysisDataset::empty();
        let _result = ForecastResult::empty();
        let _metrics = ServiceMetrics::default();
    }

    #[test]
    fn test_default_thresholds_match_policy() {
        let telework = TeleworkThresholds::default();
        assert_eq!(telework.max_percentage, 60.0);
        assert_eq!(telework.warning_threshold, 50.0);
        assert_eq!(telework.optimal_low, 20.0);
        assert_eq!(telework.optimal_high, 40.0);

        let occupancy = OccupancyThresholds::default();
        assert_eq!(occupancy.critical_high, 90.0);
        assert_eq!(occupancy.warning_high, 80.0);
        assert_eq!(occupancy.warning_low, 60.0);
        assert_eq!(occupancy.critical_low, 50.0);
    }
}
