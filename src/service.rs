//! Refresh scheduler and report cache
//!
//! Owns the single current [`AnalysisReport`]. A refresh collects data,
//! assembles a report, and publishes it by swapping an immutable snapshot
//! behind a read lock; readers clone the snapshot handle and never observe
//! a partially updated report. Refreshes are serialized by an async mutex,
//! so a trigger that fires during a running refresh blocks until the lock
//! frees: publish order equals start order and an older result can never
//! overwrite a newer one.
//!
//! Scheduled triggers (a recurring interval and a daily wall-clock time)
//! are produced by a ticker task and consumed one at a time from a work
//! queue, decoupling trigger cadence from execution.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{error, info, warn};

use crate::collector::{analyze_realtime, DataProvider, RealtimeAnalysis};
use crate::config::EngineConfig;
use crate::error::{InsightError, InsightResult};
use crate::report::{
    AnalysisReport, DomainAnomalies, DomainForecasts, OccupancyAnalysis, ReportAssembler,
    TeleworkAnalysis,
};

/// Why a refresh was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshTrigger {
    /// Recurring interval elapsed
    Interval,
    /// Daily wall-clock time reached
    Daily,
}

/// Plain counters describing service activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceMetrics {
    /// Refreshes that published a report
    pub refreshes_completed: u64,
    /// Refreshes that failed without publishing
    pub refreshes_failed: u64,
    /// Triggers fired by the background ticker
    pub scheduled_triggers: u64,
    /// Manual refresh requests
    pub manual_triggers: u64,
}

/// A cached report snapshot handed to readers
#[derive(Debug, Clone)]
pub struct ReportHandle {
    /// The immutable report
    pub report: Arc<AnalysisReport>,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Cache age in minutes at read time
    pub age_minutes: i64,
    /// True when the report is older than the refresh interval
    pub stale: bool,
}

/// The single live cache record, replaced wholesale on each refresh
#[derive(Clone)]
struct CachedReport {
    report: Arc<AnalysisReport>,
    generated_at: DateTime<Utc>,
}

/// Analysis service: refresh scheduling, caching, and on-demand analysis
pub struct InsightService<P> {
    provider: Arc<P>,
    assembler: ReportAssembler,
    config: EngineConfig,
    cache: RwLock<Option<CachedReport>>,
    refresh_lock: Mutex<()>,
    metrics: RwLock<ServiceMetrics>,
    shutdown: watch::Sender<bool>,
}

impl<P: DataProvider + 'static> InsightService<P> {
    /// Create a service over a data provider with a validated configuration
    pub fn new(provider: Arc<P>, config: EngineConfig) -> InsightResult<Self> {
        config.validate()?;
        let assembler = ReportAssembler::new(config.clone());
        Ok(Self {
            provider,
            assembler,
            config,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            metrics: RwLock::new(ServiceMetrics::default()),
            shutdown: watch::channel(false).0,
        })
    }

    /// Force a refresh and return the freshly published report
    ///
    /// Same code path as scheduled refreshes. Blocks while another refresh
    /// is in flight; on failure the previous cache entry is left untouched.
    pub async fn refresh(&self) -> InsightResult<Arc<AnalysisReport>> {
        self.metrics.write().manual_triggers += 1;
        self.run_refresh().await
    }

    /// Current cached report plus its age
    ///
    /// An empty cache triggers one synchronous refresh before returning;
    /// if that cold-start refresh fails, the cold-empty state is surfaced
    /// as [`InsightError::NoReportAvailable`].
    pub async fn current(&self) -> InsightResult<ReportHandle> {
        if let Some(handle) = self.snapshot() {
            return Ok(handle);
        }

        let _guard = self.refresh_lock.lock().await;
        // A concurrent cold-start read may have filled the cache while we
        // waited for the lock.
        if let Some(handle) = self.snapshot() {
            return Ok(handle);
        }

        info!("cache empty, running cold-start refresh");
        self.refresh_locked()
            .await
            .map_err(|e| InsightError::NoReportAvailable {
                reason: e.to_string(),
            })?;

        self.snapshot().ok_or_else(|| InsightError::NoReportAvailable {
            reason: "refresh completed without publishing".to_string(),
        })
    }

    /// Cache age in minutes, or `None` while the cache is empty
    pub fn age_minutes(&self) -> Option<i64> {
        self.cache
            .read()
            .as_ref()
            .map(|c| (Utc::now() - c.generated_at).num_minutes())
    }

    /// Telework analysis against freshly collected data, bypassing the cache
    pub async fn telework_analysis(&self) -> InsightResult<TeleworkAnalysis> {
        let dataset = self.provider.collect(self.config.collection_window_days).await?;
        Ok(self
            .assembler
            .analyze_telework(&dataset.telework, Utc::now().date_naive()))
    }

    /// Occupancy analysis against freshly collected data, bypassing the cache
    pub async fn occupancy_analysis(&self) -> InsightResult<OccupancyAnalysis> {
        let dataset = self.provider.collect(self.config.collection_window_days).await?;
        Ok(self.assembler.analyze_occupancy(&dataset.occupancy))
    }

    /// Forecasts for both domains over a caller-specified horizon,
    /// collected over the wider prediction window and bypassing the cache
    pub async fn predictions(&self, horizon_days: u32) -> InsightResult<DomainForecasts> {
        let dataset = self.provider.collect(self.config.prediction_window_days).await?;
        Ok(self.assembler.forecast_domains(&dataset, horizon_days))
    }

    /// Anomalous days for both domains, bypassing the cache
    pub async fn anomalies(&self) -> InsightResult<DomainAnomalies> {
        let dataset = self.provider.collect(self.config.collection_window_days).await?;
        Ok(self.assembler.detect_domain_anomalies(&dataset))
    }

    /// Today-only figures without running the full pipeline
    pub async fn realtime(&self) -> InsightResult<RealtimeAnalysis> {
        let snapshot = self.provider.realtime().await?;
        Ok(analyze_realtime(&snapshot))
    }

    /// Current service counters
    pub fn metrics(&self) -> ServiceMetrics {
        *self.metrics.read()
    }

    /// Start the background ticker and refresh consumer
    pub fn start(self: &Arc<Self>) {
        if *self.shutdown.borrow() {
            warn!("service already stopped, not starting scheduler");
            return;
        }
        info!(
            interval_secs = self.config.refresh_interval.as_secs(),
            daily_hour = self.config.daily_refresh_hour,
            "starting refresh scheduler"
        );

        let (tx, mut rx) = mpsc::channel::<RefreshTrigger>(8);

        // Consumer: executes refreshes one at a time off the work queue.
        let service = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                let trigger = tokio::select! {
                    _ = shutdown.changed() => break,
                    msg = rx.recv() => match msg {
                        Some(trigger) => trigger,
                        None => break,
                    },
                };
                service.metrics.write().scheduled_triggers += 1;
                match service.run_refresh().await {
                    Ok(_) => info!(?trigger, "scheduled refresh completed"),
                    // Scheduled failures are logged only; the previous
                    // cache entry keeps serving reads.
                    Err(e) => error!(?trigger, "scheduled refresh failed: {e}"),
                }
            }
            info!("refresh consumer stopped");
        });

        // Ticker: fires the recurring interval and the daily wall-clock
        // trigger; both enqueue onto the same work queue.
        let service = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(service.config.refresh_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;

            loop {
                let until_daily =
                    duration_until_daily(Utc::now(), service.config.daily_refresh_hour);
                let trigger = tokio::select! {
                    _ = shutdown.changed() => {
                        info!("refresh ticker stopped");
                        break;
                    }
                    _ = interval.tick() => RefreshTrigger::Interval,
                    _ = tokio::time::sleep(until_daily) => RefreshTrigger::Daily,
                };

                if tx.send(trigger).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Signal the background tasks to stop
    pub fn stop(&self) {
        info!("stopping refresh scheduler");
        self.shutdown.send_replace(true);
    }

    /// The single refresh code path shared by every trigger
    async fn run_refresh(&self) -> InsightResult<Arc<AnalysisReport>> {
        // Single-writer discipline: overlapping refreshes queue here, so
        // publishes happen in start order.
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Collect, assemble, and publish; the caller holds `refresh_lock`
    async fn refresh_locked(&self) -> InsightResult<Arc<AnalysisReport>> {
        info!("starting analysis refresh");
        let dataset = match self.provider.collect(self.config.collection_window_days).await {
            Ok(dataset) => dataset,
            Err(e) => {
                self.metrics.write().refreshes_failed += 1;
                warn!("refresh aborted, keeping previous report: {e}");
                return Err(e);
            }
        };

        let report = Arc::new(self.assembler.assemble(&dataset, Utc::now().date_naive()));
        let generated_at = report.generated_at;

        *self.cache.write() = Some(CachedReport {
            report: Arc::clone(&report),
            generated_at,
        });
        self.metrics.write().refreshes_completed += 1;

        info!(
            report_id = %report.id,
            alerts = report.summary.total_alerts,
            warnings = report.summary.total_warnings,
            "analysis refresh published"
        );
        Ok(report)
    }

    /// Snapshot the cache without blocking writers
    fn snapshot(&self) -> Option<ReportHandle> {
        self.cache.read().as_ref().map(|c| {
            let age_minutes = (Utc::now() - c.generated_at).num_minutes();
            ReportHandle {
                report: Arc::clone(&c.report),
                generated_at: c.generated_at,
                age_minutes,
                stale: is_stale(age_minutes, self.config.refresh_interval),
            }
        })
    }
}

/// Time remaining until the next occurrence of `hour:00:00` UTC
fn duration_until_daily(now: DateTime<Utc>, hour: u32) -> Duration {
    let Some(today_target) = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .map(|t| t.and_utc())
    else {
        // Unreachable for a validated hour; fall back to one hour.
        return Duration::from_secs(3600);
    };

    let target = if today_target > now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };

    (target - now).to_std().unwrap_or(Duration::from_secs(60))
}

/// True when the cached report is older than the refresh interval
fn is_stale(age_minutes: i64, refresh_interval: Duration) -> bool {
    age_minutes > (refresh_interval.as_secs() / 60) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_until_daily_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 6, 30, 0).unwrap();
        let d = duration_until_daily(now, 8);
        assert_eq!(d, Duration::from_secs(90 * 60));
    }

    #[test]
    fn test_duration_until_daily_rolls_over() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
        let d = duration_until_daily(now, 8);
        assert_eq!(d, Duration::from_secs(23 * 60 * 60));
    }

    #[test]
    fn test_duration_until_daily_exactly_at_target() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 8, 0, 0).unwrap();
        // At the target instant the next fire is tomorrow.
        let d = duration_until_daily(now, 8);
        assert_eq!(d, Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_is_stale() {
        let interval = Duration::from_secs(6 * 60 * 60);
        assert!(!is_stale(0, interval));
        assert!(!is_stale(360, interval));
        assert!(is_stale(361, interval));
    }
}
