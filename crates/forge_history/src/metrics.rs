//! Aggregate build metrics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-target success counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetStats {
    pub total: u64,
    pub succeeded: u64,
}

/// Rolling statistics over the retained run history.
///
/// Never mutated directly: produced by [`crate::HistoryStore::metrics`] and
/// always equal to a full fold over the retained entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Percentage in [0, 100].
    pub success_rate: f64,
    /// Average duration of succeeded runs only; a fast failure must not
    /// drag the average toward "fast".
    pub avg_duration_seconds: f64,
    pub last_run_at: Option<DateTime<Utc>>,
    /// Per-target breakdown, keyed by target label.
    pub targets: BTreeMap<String, TargetStats>,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = Metrics::default();
        assert!(metrics.is_empty());
        assert_eq!(metrics.success_rate, 0.0);
        assert!(metrics.last_run_at.is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let metrics = Metrics {
            total: 4,
            succeeded: 3,
            failed: 1,
            success_rate: 75.0,
            avg_duration_seconds: 2.5,
            last_run_at: None,
            targets: BTreeMap::new(),
        };

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["total"], 4);
        assert_eq!(json["succeeded"], 3);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["success_rate"], 75.0);
        assert_eq!(json["avg_duration_seconds"], 2.5);
    }
}
