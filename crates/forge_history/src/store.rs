//! Append-only run history with rolling metrics.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use forge_runner::RunResult;

use crate::metrics::{Metrics, TargetStats};

/// Default number of retained runs.
pub const DEFAULT_RETENTION: usize = 100;

/// One retained run, tagged with the target label it was recorded under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub target_label: String,
    pub result: RunResult,
}

#[derive(Debug, Clone, Default)]
struct RunningSums {
    total: u64,
    succeeded: u64,
    failed: u64,
    success_duration_ms: u64,
    targets: BTreeMap<String, TargetStats>,
}

impl RunningSums {
    fn add(&mut self, entry: &HistoryEntry) {
        self.total += 1;
        if entry.result.succeeded {
            self.succeeded += 1;
            self.success_duration_ms += entry.result.duration_ms;
        } else {
            self.failed += 1;
        }
        let stats = self.targets.entry(entry.target_label.clone()).or_default();
        stats.total += 1;
        if entry.result.succeeded {
            stats.succeeded += 1;
        }
    }

    fn remove(&mut self, entry: &HistoryEntry) {
        self.total -= 1;
        if entry.result.succeeded {
            self.succeeded -= 1;
            self.success_duration_ms -= entry.result.duration_ms;
        } else {
            self.failed -= 1;
        }
        if let Some(stats) = self.targets.get_mut(&entry.target_label) {
            stats.total -= 1;
            if entry.result.succeeded {
                stats.succeeded -= 1;
            }
            // Empty buckets must disappear so sums stay equal to a fold
            // over the retained entries.
            if stats.total == 0 {
                self.targets.remove(&entry.target_label);
            }
        }
    }
}

/// Append-only log of run results plus derived metrics.
///
/// Entries are retained FIFO up to the retention bound; running sums are
/// maintained on both append and eviction so `metrics()` is O(1) while
/// staying equal to [`HistoryStore::recompute`], the full fold.
///
/// The store is in-memory only; persistence is a caller concern.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    retention: usize,
    entries: VecDeque<HistoryEntry>,
    sums: RunningSums,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// A store keeping at most `retention` entries (minimum 1).
    pub fn with_retention(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            entries: VecDeque::new(),
            sums: RunningSums::default(),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a completed run under a target label. Oldest entries beyond
    /// the retention bound are evicted.
    pub fn append(&mut self, result: RunResult, target_label: impl Into<String>) {
        let entry = HistoryEntry {
            target_label: target_label.into(),
            result,
        };
        self.sums.add(&entry);
        self.entries.push_back(entry);

        while self.entries.len() > self.retention {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(
                    target = %evicted.target_label,
                    "Evicting run beyond retention of {}", self.retention
                );
                self.sums.remove(&evicted);
            }
        }
    }

    /// Shrink (or grow) the retention bound, evicting excess entries.
    pub fn set_retention(&mut self, retention: usize) {
        self.retention = retention.max(1);
        while self.entries.len() > self.retention {
            if let Some(evicted) = self.entries.pop_front() {
                self.sums.remove(&evicted);
            }
        }
    }

    /// Up to `n` most recent results, newest first.
    pub fn recent(&self, n: usize) -> Vec<&RunResult> {
        self.entries
            .iter()
            .rev()
            .take(n)
            .map(|entry| &entry.result)
            .collect()
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Current metrics, from the running sums.
    pub fn metrics(&self) -> Metrics {
        let sums = &self.sums;
        Metrics {
            total: sums.total,
            succeeded: sums.succeeded,
            failed: sums.failed,
            success_rate: if sums.total > 0 {
                sums.succeeded as f64 / sums.total as f64 * 100.0
            } else {
                0.0
            },
            avg_duration_seconds: if sums.succeeded > 0 {
                sums.success_duration_ms as f64 / sums.succeeded as f64 / 1000.0
            } else {
                0.0
            },
            last_run_at: self.entries.back().map(|entry| entry.result.started_at),
            targets: sums.targets.clone(),
        }
    }

    /// Metrics recomputed by a full fold over the retained entries. The
    /// running sums must never diverge from this.
    pub fn recompute(&self) -> Metrics {
        let mut sums = RunningSums::default();
        for entry in &self.entries {
            sums.add(entry);
        }
        Metrics {
            total: sums.total,
            succeeded: sums.succeeded,
            failed: sums.failed,
            success_rate: if sums.total > 0 {
                sums.succeeded as f64 / sums.total as f64 * 100.0
            } else {
                0.0
            },
            avg_duration_seconds: if sums.succeeded > 0 {
                sums.success_duration_ms as f64 / sums.succeeded as f64 / 1000.0
            } else {
                0.0
            },
            last_run_at: self.entries.back().map(|entry| entry.result.started_at),
            targets: sums.targets,
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forge_runner::{CommandSpec, FailureKind, RunResult, TargetKind};

    fn result(succeeded: bool, duration_ms: u64) -> RunResult {
        RunResult {
            spec: CommandSpec::new("flutter").arg("build"),
            exit_code: Some(if succeeded { 0 } else { 1 }),
            lines: Vec::new(),
            succeeded,
            started_at: Utc::now(),
            duration_ms,
            failure: (!succeeded).then(|| "exited with code 1".to_string()),
            failure_kind: (!succeeded).then_some(FailureKind::NonZeroExit),
        }
    }

    #[test]
    fn test_append_updates_counters() {
        let mut store = HistoryStore::new();
        store.append(result(true, 2_000), TargetKind::Android.label());
        store.append(result(false, 500), TargetKind::Android.label());
        store.append(result(true, 4_000), TargetKind::Web.label());

        let metrics = store.metrics();
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.succeeded, 2);
        assert_eq!(metrics.failed, 1);
        assert!((metrics.success_rate - 66.666).abs() < 0.01);
        assert_eq!(metrics.targets["android"].total, 2);
        assert_eq!(metrics.targets["android"].succeeded, 1);
        assert_eq!(metrics.targets["web"].succeeded, 1);
        assert!(metrics.last_run_at.is_some());
    }

    #[test]
    fn test_average_excludes_failed_runs() {
        let mut store = HistoryStore::new();
        store.append(result(true, 2_000), "host");
        store.append(result(true, 4_000), "host");
        // A fast failure must not drag the average down.
        store.append(result(false, 10), "host");

        assert!((store.metrics().avg_duration_seconds - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_equal_full_fold_after_every_append() {
        let mut store = HistoryStore::with_retention(5);
        for i in 0..20 {
            store.append(result(i % 3 != 0, 100 * i), if i % 2 == 0 { "web" } else { "android" });
            assert_eq!(store.metrics(), store.recompute(), "drift after append {i}");
        }
    }

    #[test]
    fn test_retention_bound_evicts_fifo() {
        let mut store = HistoryStore::with_retention(3);
        for i in 0..5u64 {
            let mut r = result(true, 0);
            r.spec = CommandSpec::new(format!("cmd-{i}"));
            store.append(r, "host");
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.metrics().total, 3);

        // Oldest entries are gone; newest first.
        let recent = store.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].spec.program, "cmd-4");
        assert_eq!(recent[2].spec.program, "cmd-2");

        assert_eq!(store.recent(2).len(), 2);
    }

    #[test]
    fn test_eviction_drops_empty_target_buckets() {
        let mut store = HistoryStore::with_retention(2);
        store.append(result(true, 100), "ios");
        store.append(result(true, 100), "web");
        store.append(result(true, 100), "web");

        let metrics = store.metrics();
        assert!(!metrics.targets.contains_key("ios"));
        assert_eq!(store.metrics(), store.recompute());
    }

    #[test]
    fn test_set_retention_shrinks() {
        let mut store = HistoryStore::with_retention(10);
        for _ in 0..10 {
            store.append(result(true, 100), "host");
        }
        store.set_retention(4);

        assert_eq!(store.len(), 4);
        assert_eq!(store.metrics(), store.recompute());
    }
}
