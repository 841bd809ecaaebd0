//! Mock command runner for testing.
//!
//! Returns scripted outcomes without spawning processes, while still
//! deriving success the way the real runner does (exit code AND error
//! lines), so downstream code sees faithful results.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::classify::{OutputClassifier, Severity};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, FailureKind, LineSource, OutputLine, RunResult};
use crate::spec::CommandSpec;

/// Scripted outcome for one `run` call.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub exit_code: i32,
    pub lines: Vec<(LineSource, String)>,
    pub duration_ms: u64,
}

impl ScriptedRun {
    pub fn success(lines: &[&str]) -> Self {
        Self {
            exit_code: 0,
            lines: lines
                .iter()
                .map(|l| (LineSource::Stdout, l.to_string()))
                .collect(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i32, stderr: &[&str]) -> Self {
        Self {
            exit_code,
            lines: stderr
                .iter()
                .map(|l| (LineSource::Stderr, l.to_string()))
                .collect(),
            duration_ms: 100,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Mock [`CommandRunner`] that replays scripted results and captures the
/// specs it was called with, for verification.
#[derive(Clone)]
pub struct MockCommandRunner {
    classifier: Arc<OutputClassifier>,
    responses: Arc<RwLock<Vec<ScriptedRun>>>,
    response_index: Arc<AtomicUsize>,
    captured: Arc<RwLock<Vec<CommandSpec>>>,
    busy: Arc<AtomicBool>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(OutputClassifier::with_defaults()),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured: Arc::new(RwLock::new(Vec::new())),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn script(self, run: ScriptedRun) -> Self {
        self.responses.write().push(run);
        self
    }

    /// Make the next `run` call fail with `Busy`.
    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    /// Specs captured from every `run` call, in order.
    pub fn captured_specs(&self) -> Vec<CommandSpec> {
        self.captured.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> RunnerResult<RunResult> {
        if self.busy.load(Ordering::SeqCst) {
            return Err(RunnerError::Busy);
        }
        self.captured.write().push(spec.clone());

        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        let scripted = {
            let responses = self.responses.read();
            responses
                .get(index)
                .cloned()
                .unwrap_or_else(|| ScriptedRun::success(&[]))
        };

        let mut error_seen = false;
        let lines: Vec<OutputLine> = scripted
            .lines
            .iter()
            .enumerate()
            .map(|(index, (source, text))| {
                let severity = self.classifier.classify(text);
                if severity == Severity::Error {
                    error_seen = true;
                }
                OutputLine {
                    index,
                    text: text.clone(),
                    severity,
                    source: *source,
                    elapsed_ms: 0,
                }
            })
            .collect();

        let succeeded = scripted.exit_code == 0 && !error_seen;
        let (failure, failure_kind) = if succeeded {
            (None, None)
        } else if error_seen {
            (
                Some("Error output detected".to_string()),
                Some(FailureKind::ErrorOutput),
            )
        } else {
            (
                Some(format!("exited with code {}", scripted.exit_code)),
                Some(FailureKind::NonZeroExit),
            )
        };

        Ok(RunResult {
            spec: spec.clone(),
            exit_code: Some(scripted.exit_code),
            lines,
            succeeded,
            started_at: Utc::now(),
            duration_ms: scripted.duration_ms,
            failure,
            failure_kind,
        })
    }

    fn cancel(&self) {}
}
