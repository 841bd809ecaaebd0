//! Command runner trait and result types.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::Severity;
use crate::error::RunnerResult;
use crate::spec::CommandSpec;

/// Which pipe a line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// One classified line of process output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputLine {
    /// Position in the run's combined output sequence.
    pub index: usize,
    pub text: String,
    pub severity: Severity,
    pub source: LineSource,
    /// Milliseconds since the run started.
    pub elapsed_ms: u64,
}

/// Why a run was marked failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The executable could not be started.
    Spawn,
    /// The configured wall-clock limit was exceeded.
    Timeout,
    /// `cancel()` was requested while the run was in flight.
    Cancelled,
    /// Output contained an error-classified line (exit code may be 0).
    ErrorOutput,
    /// The process exited with a non-zero code and no error line.
    NonZeroExit,
}

/// Immutable record of one completed (or aborted) command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// The spec the run was started with.
    pub spec: CommandSpec,
    /// Exit code; `None` when the process was killed or never spawned.
    pub exit_code: Option<i32>,
    /// Combined output, in arrival order.
    pub lines: Vec<OutputLine>,
    /// Exit code 0 AND no error-classified line AND not aborted.
    pub succeeded: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Human-readable failure summary, distinct from the raw output.
    pub failure: Option<String>,
    pub failure_kind: Option<FailureKind>,
}

impl RunResult {
    pub fn duration_seconds(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    /// Error-classified lines, in arrival order.
    pub fn error_lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines
            .iter()
            .filter(|line| line.severity == Severity::Error)
    }

    /// Count of lines at a given severity.
    pub fn count_at(&self, severity: Severity) -> usize {
        self.lines
            .iter()
            .filter(|line| line.severity == severity)
            .count()
    }
}

/// Synchronous per-line observer. Called in the exact order lines were
/// produced by the process, stdout and stderr interleaved by arrival time.
pub type LineObserver = Arc<dyn Fn(&OutputLine) + Send + Sync>;

/// Command execution seam.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute a command to completion, classifying output as it streams.
    ///
    /// At most one run may be in flight per runner; a concurrent call fails
    /// fast with [`crate::RunnerError::Busy`] instead of queuing. Spawn
    /// failures, timeouts, and cancellations come back as a failed
    /// [`RunResult`] with a populated failure summary, so the caller can
    /// record them in history like any other outcome.
    async fn run(&self, spec: &CommandSpec) -> RunnerResult<RunResult>;

    /// Request termination of the in-flight process, if any. Best effort:
    /// the result reflects whatever output was captured up to termination.
    fn cancel(&self);
}
