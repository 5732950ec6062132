//! Alert and recommendation generation
//!
//! Maps a current metric value against the threshold policy. Each ladder is
//! mutually exclusive and ordered by severity: only the highest-priority
//! matching band fires per evaluation. The short-circuit ordering below is
//! part of the contract and must not be re-derived from band membership.

use serde::{Deserialize, Serialize};

use crate::config::{OccupancyThresholds, TeleworkThresholds};
use crate::series::round2;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Immediate action required
    Critical,
    /// Situation to monitor
    Warning,
    /// Advisory recommendation
    Info,
}

/// A single alert, warning, or recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Severity tier
    pub severity: Severity,
    /// What was observed
    pub message: String,
    /// What to do about it
    pub action: String,
}

/// Direction of a workstation count adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentDirection {
    /// Add workstations
    Add,
    /// Remove workstations
    Remove,
}

/// Urgency of a workstation count adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentPriority {
    /// Act now
    High,
    /// Plan for it
    Medium,
}

/// Recommended change to the workstation inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkstationAdjustment {
    /// Add or remove
    pub direction: AdjustmentDirection,
    /// Number of workstations affected
    pub quantity: u32,
    /// Urgency
    pub priority: AdjustmentPriority,
    /// Why the adjustment is recommended
    pub reason: String,
}

/// Findings produced by one threshold evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdFindings {
    /// Critical alerts
    pub alerts: Vec<Finding>,
    /// Warnings
    pub warnings: Vec<Finding>,
    /// Informational recommendations
    pub recommendations: Vec<Finding>,
    /// Workstation count adjustments (occupancy domain only)
    pub workstation_recommendations: Vec<WorkstationAdjustment>,
}

/// Evaluate the telework ladder for the current percentage of staff
/// teleworking today
pub fn evaluate_telework(current_pct: f64, thresholds: &TeleworkThresholds) -> ThresholdFindings {
    let mut findings = ThresholdFindings::default();
    let value = round2(current_pct);

    if value > thresholds.max_percentage {
        findings.alerts.push(Finding {
            severity: Severity::Critical,
            message: format!(
                "Critical telework level: {value}% (max: {}%)",
                thresholds.max_percentage
            ),
            action: "Reduce telework authorizations immediately".to_string(),
        });
    } else if value > thresholds.warning_threshold {
        findings.warnings.push(Finding {
            severity: Severity::Warning,
            message: format!("Elevated telework level: {value}%"),
            action: "Monitor and limit new requests".to_string(),
        });
    } else if value < thresholds.optimal_low {
        findings.recommendations.push(Finding {
            severity: Severity::Info,
            message: format!("Low telework level: {value}%"),
            action: "Encourage telework to optimize office space".to_string(),
        });
    }

    findings
}

/// Evaluate the occupancy ladder for the current percentage of desks in use
///
/// The high-side checks run before the low-side checks; when a misconfigured
/// policy makes a value fall inside several nominal bands, this ordering
/// resolves it deterministically.
pub fn evaluate_occupancy(current_pct: f64, thresholds: &OccupancyThresholds) -> ThresholdFindings {
    let mut findings = ThresholdFindings::default();
    let value = round2(current_pct);

    if value > thresholds.critical_high {
        findings.alerts.push(Finding {
            severity: Severity::Critical,
            message: format!("Critical occupancy: {value}%"),
            action: "Add workstations immediately".to_string(),
        });
        findings.workstation_recommendations.push(WorkstationAdjustment {
            direction: AdjustmentDirection::Add,
            quantity: additional_workstations(value),
            priority: AdjustmentPriority::High,
            reason: "Critical occupancy detected".to_string(),
        });
    } else if value > thresholds.warning_high {
        findings.warnings.push(Finding {
            severity: Severity::Warning,
            message: format!("High occupancy: {value}%"),
            action: "Plan to add workstations".to_string(),
        });
    } else if value < thresholds.critical_low {
        findings.alerts.push(Finding {
            severity: Severity::Critical,
            message: format!("Very low occupancy: {value}%"),
            action: "Consider reducing the number of workstations".to_string(),
        });
        findings.workstation_recommendations.push(WorkstationAdjustment {
            direction: AdjustmentDirection::Remove,
            quantity: removable_workstations(value),
            priority: AdjustmentPriority::Medium,
            reason: "Low occupancy detected".to_string(),
        });
    } else if value < thresholds.warning_low {
        findings.warnings.push(Finding {
            severity: Severity::Warning,
            message: format!("Low occupancy: {value}%"),
            action: "Analyze workstation usage".to_string(),
        });
    }

    findings
}

/// Workstations to add under critical-high occupancy
pub fn additional_workstations(occupancy: f64) -> u32 {
    if occupancy > 95.0 {
        5
    } else if occupancy > 90.0 {
        3
    } else if occupancy > 85.0 {
        2
    } else {
        1
    }
}

/// Workstations that can be removed under critical-low occupancy
pub fn removable_workstations(occupancy: f64) -> u32 {
    if occupancy < 30.0 {
        3
    } else if occupancy < 50.0 {
        2
    } else {
        1
    }
}
