//! Engine error types

use thiserror::Error;

/// Errors produced by the insight engine and its collaborators
#[derive(Debug, Error)]
pub enum InsightError {
    /// Data collection from an upstream source failed
    #[error("data collection failed for {source_name}: {reason}")]
    Collection {
        /// Name of the upstream source that failed
        source_name: String,
        /// Human-readable failure cause
        reason: String,
    },

    /// Model fitting or prediction failed
    #[error("model error: {reason}")]
    Model {
        /// Human-readable failure cause
        reason: String,
    },

    /// Invalid threshold or engine configuration
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// A metric series violated its ordering invariant
    #[error("invalid metric series: {reason}")]
    InvalidSeries {
        /// Description of the violated invariant
        reason: String,
    },

    /// The cache is empty and the cold-start refresh did not produce a report
    #[error("no analysis report available yet: {reason}")]
    NoReportAvailable {
        /// Why the cold-start refresh failed
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },
}

/// Result alias used throughout the crate
pub type InsightResult<T> = Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_error_display() {
        let error = InsightError::Collection {
            source_name: "reservation".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "data collection failed for reservation: connection refused"
        );
    }

    #[test]
    fn test_no_report_available_display() {
        let error = InsightError::NoReportAvailable {
            reason: "initial refresh failed".to_string(),
        };
        assert!(error.to_string().contains("no analysis report available"));
    }

    #[test]
    fn test_invalid_series_display() {
        let error = InsightError::InvalidSeries {
            reason: "dates not strictly increasing".to_string(),
        };
        assert!(error.to_string().contains("dates not strictly increasing"));
    }
}
