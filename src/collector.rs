//! Data collection boundary
//!
//! The engine never touches a data store. An external collaborator
//! implements [`DataProvider`] and hands over one [`AnalysisDataset`] per
//! cycle: daily percentage series for both metric domains plus the
//! denominators they were derived from. [`DatasetBuilder`] covers the
//! count-to-percentage conversion so providers only ship raw daily counts.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InsightResult;
use crate::series::{round2, MetricPoint, MetricSeries};

/// Raw daily count from an upstream source
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyCount {
    /// Calendar day
    pub date: NaiveDate,
    /// Count observed that day (approved requests, desks used, ...)
    pub count: u64,
}

/// Everything the engine consumes for one analysis cycle
#[derive(Debug, Clone, Default)]
pub struct AnalysisDataset {
    /// Daily telework percentage of staff
    pub telework: MetricSeries,
    /// Daily desk occupancy percentage
    pub occupancy: MetricSeries,
    /// Staff roster size used as the telework denominator
    pub headcount: usize,
    /// Desk inventory size used as the occupancy denominator
    pub total_desks: usize,
}

impl AnalysisDataset {
    /// Dataset with no observations in either domain
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Converts raw daily counts into the percentage series the engine consumes
pub struct DatasetBuilder;

impl DatasetBuilder {
    /// Convert daily counts to a percentage series over a denominator
    ///
    /// A zero denominator yields an empty series: without a population
    /// there is no rate to analyze.
    pub fn percentage_series(
        counts: &[DailyCount],
        denominator: usize,
    ) -> InsightResult<MetricSeries> {
        if denominator == 0 {
            return Ok(MetricSeries::empty());
        }
        let points = counts
            .iter()
            .map(|c| MetricPoint {
                date: c.date,
                value: c.count as f64 / denominator as f64 * 100.0,
            })
            .collect();
        MetricSeries::from_points(points)
    }
}

/// Today-only figures for the lightweight real-time path
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RealtimeSnapshot {
    /// Desks in use today
    pub desks_used: u64,
    /// Active desk inventory
    pub total_desks: u64,
    /// Telework requests approved for today
    pub telework_approved_today: u64,
}

/// Status classification of the real-time occupancy figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealtimeStatus {
    /// Occupancy within normal bounds
    Normal,
    /// Occupancy below 50%
    WarningLow,
    /// Occupancy above 80%
    WarningHigh,
    /// Occupancy above 90%
    CriticalHigh,
}

/// Quick analysis of a real-time snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeAnalysis {
    /// Today's occupancy percentage
    pub today_occupancy: f64,
    /// Telework approvals counted for today
    pub today_telework: u64,
    /// Status ladder result
    pub status: RealtimeStatus,
}

/// Classify a real-time snapshot without running the full pipeline
pub fn analyze_realtime(snapshot: &RealtimeSnapshot) -> RealtimeAnalysis {
    let today_occupancy = if snapshot.total_desks > 0 {
        round2(snapshot.desks_used as f64 / snapshot.total_desks as f64 * 100.0)
    } else {
        0.0
    };

    let status = if today_occupancy > 90.0 {
        RealtimeStatus::CriticalHigh
    } else if today_occupancy > 80.0 {
        RealtimeStatus::WarningHigh
    } else if today_occupancy < 50.0 {
        RealtimeStatus::WarningLow
    } else {
        RealtimeStatus::Normal
    };

    RealtimeAnalysis {
        today_occupancy,
        today_telework: snapshot.telework_approved_today,
        status,
    }
}

/// External collaborator that produces the engine's input tables
///
/// Implementations own all storage access (databases, HTTP services).
/// A failed collection aborts the refresh that requested it; the engine
/// keeps serving the previous report.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Collect a complete dataset covering the last `window_days` days
    async fn collect(&self, window_days: u32) -> InsightResult<AnalysisDataset>;

    /// Fetch today-only figures for the real-time path
    async fn realtime(&self) -> InsightResult<RealtimeSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_percentage_series_conversion() {
        let counts = vec![
            DailyCount { date: date(1), count: 3 },
            DailyCount { date: date(2), count: 15 },
        ];
        let series = DatasetBuilder::percentage_series(&counts, 30).unwrap();
        assert_eq!(series.values(), vec![10.0, 50.0]);
    }

    #[test]
    fn test_zero_denominator_yields_empty_series() {
        let counts = vec![DailyCount { date: date(1), count: 3 }];
        let series = DatasetBuilder::percentage_series(&counts, 0).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_realtime_status_ladder() {
        let snapshot = |used| RealtimeSnapshot {
            desks_used: used,
            total_desks: 100,
            telework_approved_today: 4,
        };
        assert_eq!(analyze_realtime(&snapshot(95)).status, RealtimeStatus::CriticalHigh);
        assert_eq!(analyze_realtime(&snapshot(85)).status, RealtimeStatus::WarningHigh);
        assert_eq!(analyze_realtime(&snapshot(40)).status, RealtimeStatus::WarningLow);
        assert_eq!(analyze_realtime(&snapshot(65)).status, RealtimeStatus::Normal);
    }

    #[test]
    fn test_realtime_no_desks() {
        let analysis = analyze_realtime(&RealtimeSnapshot {
            desks_used: 0,
            total_desks: 0,
            telework_approved_today: 2,
        });
        assert_eq!(analysis.today_occupancy, 0.0);
        assert_eq!(analysis.status, RealtimeStatus::WarningLow);
        assert_eq!(analysis.today_telework, 2);
    }
}
