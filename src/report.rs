//! Report assembly
//!
//! Runs the trend classifier, threshold ladders, temporal aggregation,
//! forecaster, and anomaly detector for both metric domains and combines
//! the results into one immutable [`AnalysisReport`]. A domain with no
//! input yields a defined empty analysis; sub-analysis failures never
//! abort the report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::advisor::{self, Finding, Severity, WorkstationAdjustment};
use crate::anomaly;
use crate::collector::AnalysisDataset;
use crate::config::EngineConfig;
use crate::forecast::{ForecastResult, Forecaster};
use crate::series::{round2, MetricSeries};
use crate::temporal::{self, DailyPercentage};
use crate::trend::{self, TrendResult, OCCUPANCY_TOLERANCE, TELEWORK_TOLERANCE};

/// Telework domain analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleworkAnalysis {
    /// Most recent daily telework percentage
    pub current_percentage: f64,
    /// Trend over the two most recent 7-day windows
    pub trend: TrendResult,
    /// Per-day percentages for the full input window
    pub daily_percentages: Vec<DailyPercentage>,
    /// Week-to-date average (present days only)
    pub weekly_percentage: f64,
    /// Month-to-date average (missing days zero-filled)
    pub monthly_percentage: f64,
    /// Critical alerts
    pub alerts: Vec<Finding>,
    /// Warnings
    pub warnings: Vec<Finding>,
    /// Informational recommendations
    pub recommendations: Vec<Finding>,
}

impl TeleworkAnalysis {
    /// The defined result for an empty input series
    pub fn empty() -> Self {
        Self {
            current_percentage: 0.0,
            trend: TrendResult::insufficient(),
            daily_percentages: Vec::new(),
            weekly_percentage: 0.0,
            monthly_percentage: 0.0,
            alerts: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Desk occupancy domain analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyAnalysis {
    /// Most recent daily occupancy percentage
    pub current_occupancy: f64,
    /// Mean occupancy over the input window
    pub average_occupancy: f64,
    /// Trend over the two most recent 7-day windows
    pub trend: TrendResult,
    /// Critical alerts
    pub alerts: Vec<Finding>,
    /// Warnings
    pub warnings: Vec<Finding>,
    /// Informational recommendations
    pub recommendations: Vec<Finding>,
    /// Workstation count adjustments
    pub workstation_recommendations: Vec<WorkstationAdjustment>,
}

impl OccupancyAnalysis {
    /// The defined result for an empty input series
    pub fn empty() -> Self {
        Self {
            current_occupancy: 0.0,
            average_occupancy: 0.0,
            trend: TrendResult::insufficient(),
            alerts: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
            workstation_recommendations: Vec::new(),
        }
    }
}

/// Forecasts per metric domain; a domain with empty input is skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainForecasts {
    /// Occupancy forecast
    pub occupancy: Option<ForecastResult>,
    /// Telework forecast
    pub telework: Option<ForecastResult>,
}

/// Anomalous dates per metric domain; a domain with empty input is skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainAnomalies {
    /// Anomalous occupancy days
    pub occupancy: Option<Vec<NaiveDate>>,
    /// Anomalous telework days
    pub telework: Option<Vec<NaiveDate>>,
}

/// One entry of the prioritized action list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityAction {
    /// CRITICAL for alerts, WARNING for warnings
    pub priority: Severity,
    /// What to do
    pub action: String,
    /// The finding that triggered it
    pub reason: String,
}

/// Cross-domain summary of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Alert count across both domains
    pub total_alerts: usize,
    /// Warning count across both domains
    pub total_warnings: usize,
    /// Recommendation count across both domains
    pub total_recommendations: usize,
    /// All alerts then all warnings, source order preserved per tier
    pub priority_actions: Vec<PriorityAction>,
}

/// Complete analysis report; immutable once constructed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Report identity
    pub id: Uuid,
    /// When the analysis ran
    pub generated_at: DateTime<Utc>,
    /// Telework domain analysis
    pub telework_analysis: TeleworkAnalysis,
    /// Occupancy domain analysis
    pub reservation_analysis: OccupancyAnalysis,
    /// Forecasts per domain
    pub predictions: DomainForecasts,
    /// Anomalous dates per domain
    pub anomalies: DomainAnomalies,
    /// Cross-domain summary
    pub summary: ReportSummary,
}

/// Combines all analysis components into one report
pub struct ReportAssembler {
    config: EngineConfig,
    forecaster: Forecaster,
}

impl ReportAssembler {
    /// Create an assembler for a validated configuration
    pub fn new(config: EngineConfig) -> Self {
        let forecaster = Forecaster::new(config.model.clone());
        Self { config, forecaster }
    }

    /// Analyze the telework domain
    pub fn analyze_telework(&self, series: &MetricSeries, today: NaiveDate) -> TeleworkAnalysis {
        if series.is_empty() {
            return TeleworkAnalysis::empty();
        }

        let current = round2(series.current_value());
        let findings = advisor::evaluate_telework(current, &self.config.telework_thresholds);

        TeleworkAnalysis {
            current_percentage: current,
            trend: trend::classify(series, TELEWORK_TOLERANCE),
            daily_percentages: temporal::daily_percentages(series),
            weekly_percentage: temporal::week_to_date_average(series, today),
            monthly_percentage: temporal::month_to_date_average(series, today),
            alerts: findings.alerts,
            warnings: findings.warnings,
            recommendations: findings.recommendations,
        }
    }

    /// Analyze the occupancy domain
    pub fn analyze_occupancy(&self, series: &MetricSeries) -> OccupancyAnalysis {
        if series.is_empty() {
            return OccupancyAnalysis::empty();
        }

        let current = round2(series.current_value());
        let findings = advisor::evaluate_occupancy(current, &self.config.occupancy_thresholds);

        OccupancyAnalysis {
            current_occupancy: current,
            average_occupancy: round2(series.mean_value()),
            trend: trend::classify(series, OCCUPANCY_TOLERANCE),
            alerts: findings.alerts,
            warnings: findings.warnings,
            recommendations: findings.recommendations,
            workstation_recommendations: findings.workstation_recommendations,
        }
    }

    /// Forecast both domains, skipping empty inputs
    pub fn forecast_domains(&self, dataset: &AnalysisDataset, horizon_days: u32) -> DomainForecasts {
        DomainForecasts {
            occupancy: (!dataset.occupancy.is_empty())
                .then(|| self.forecaster.forecast(&dataset.occupancy, horizon_days)),
            telework: (!dataset.telework.is_empty())
                .then(|| self.forecaster.forecast(&dataset.telework, horizon_days)),
        }
    }

    /// Detect anomalies in both domains, skipping empty inputs
    pub fn detect_domain_anomalies(&self, dataset: &AnalysisDataset) -> DomainAnomalies {
        DomainAnomalies {
            occupancy: (!dataset.occupancy.is_empty()).then(|| anomaly::detect(&dataset.occupancy)),
            telework: (!dataset.telework.is_empty()).then(|| anomaly::detect(&dataset.telework)),
        }
    }

    /// Assemble the complete report for one dataset
    ///
    /// `today` is the analysis day used by the temporal aggregation; it is
    /// evaluated at analysis time, not derived from the data.
    pub fn assemble(&self, dataset: &AnalysisDataset, today: NaiveDate) -> AnalysisReport {
        debug!(
            telework_days = dataset.telework.len(),
            occupancy_days = dataset.occupancy.len(),
            "assembling analysis report"
        );

        let telework_analysis = self.analyze_telework(&dataset.telework, today);
        let reservation_analysis = self.analyze_occupancy(&dataset.occupancy);
        let predictions = self.forecast_domains(dataset, self.config.model.prediction_days);
        let anomalies = self.detect_domain_anomalies(dataset);
        let summary = build_summary(&telework_analysis, &reservation_analysis);

        AnalysisReport {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            telework_analysis,
            reservation_analysis,
            predictions,
            anomalies,
            summary,
        }
    }
}

/// Aggregate finding counts and flatten alerts and warnings into one
/// priority-ordered action list
fn build_summary(telework: &TeleworkAnalysis, occupancy: &OccupancyAnalysis) -> ReportSummary {
    let mut priority_actions = Vec::new();

    for alert in telework.alerts.iter().chain(&occupancy.alerts) {
        priority_actions.push(PriorityAction {
            priority: Severity::Critical,
            action: alert.action.clone(),
            reason: alert.message.clone(),
        });
    }
    for warning in telework.warnings.iter().chain(&occupancy.warnings) {
        priority_actions.push(PriorityAction {
            priority: Severity::Warning,
            action: warning.action.clone(),
            reason: warning.message.clone(),
        });
    }

    ReportSummary {
        total_alerts: telework.alerts.len() + occupancy.alerts.len(),
        total_warnings: telework.warnings.len() + occupancy.warnings.len(),
        total_recommendations: telework.recommendations.len() + occupancy.recommendations.len(),
        priority_actions,
    }
}
