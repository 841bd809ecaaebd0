//! Process-backed command runner with streamed output classification.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::classify::{OutputClassifier, Severity};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{
    CommandRunner, FailureKind, LineObserver, LineSource, OutputLine, RunResult,
};
use crate::spec::CommandSpec;

/// Interval of the drain loop. Cancellation and timeout are observed within
/// one cycle.
const READ_CYCLE: Duration = Duration::from_millis(50);

/// Runs external commands one at a time, streaming each output line through
/// the classifier and an optional observer while the process is live.
pub struct ProcessRunner {
    classifier: OutputClassifier,
    observer: Option<LineObserver>,
    in_flight: AtomicBool,
    cancel_requested: Arc<AtomicBool>,
}

impl ProcessRunner {
    pub fn new(classifier: OutputClassifier) -> Self {
        Self {
            classifier,
            observer: None,
            in_flight: AtomicBool::new(false),
            cancel_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a synchronous per-line observer.
    pub fn with_observer(mut self, observer: LineObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    fn spawn_reader(
        reader: impl BufRead + Send + 'static,
        source: LineSource,
        tx: mpsc::Sender<(LineSource, String)>,
    ) {
        std::thread::spawn(move || {
            for line in reader.lines() {
                let Ok(text) = line else { break };
                // Receiver dropped means the run was aborted; stop reading.
                if tx.send((source, text)).is_err() {
                    break;
                }
            }
        });
    }

    /// The blocking run loop. Returns a RunResult for every spawned (or
    /// unspawnable) command; only precondition violations surface as Err.
    fn execute(&self, spec: &CommandSpec) -> RunnerResult<RunResult> {
        let started_at = Utc::now();
        let start = Instant::now();

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        cmd.stderr(if spec.capture_stderr {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        debug!("Executing: {}", spec.display_command());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn '{}': {}", spec.program, e);
                return Ok(RunResult {
                    spec: spec.clone(),
                    exit_code: None,
                    lines: Vec::new(),
                    succeeded: false,
                    started_at,
                    duration_ms: start.elapsed().as_millis() as u64,
                    failure: Some(format!("Failed to spawn '{}': {}", spec.program, e)),
                    failure_kind: Some(FailureKind::Spawn),
                });
            }
        };

        let (tx, rx) = mpsc::channel::<(LineSource, String)>();
        if let Some(stdout) = child.stdout.take() {
            Self::spawn_reader(BufReader::new(stdout), LineSource::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            Self::spawn_reader(BufReader::new(stderr), LineSource::Stderr, tx.clone());
        }
        drop(tx);

        let timeout = spec.timeout_seconds.map(Duration::from_secs);
        let mut lines: Vec<OutputLine> = Vec::new();
        let mut error_seen = false;
        let mut aborted: Option<(FailureKind, String)> = None;
        let mut exit_status = None;
        let mut readers_done = false;

        loop {
            match rx.recv_timeout(READ_CYCLE) {
                Ok((source, text)) => {
                    let severity = self.classifier.classify(&text);
                    let line = OutputLine {
                        index: lines.len(),
                        text,
                        severity,
                        source,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    };
                    if let Some(observer) = &self.observer {
                        observer(&line);
                    }
                    let is_error = line.severity == Severity::Error;
                    lines.push(line);
                    if is_error {
                        error_seen = true;
                        if spec.fail_fast {
                            let _ = child.kill();
                            aborted = Some((
                                FailureKind::ErrorOutput,
                                "Error output detected, execution stopped".to_string(),
                            ));
                            break;
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    readers_done = true;
                    // Both pipes are closed; pace the wait loop ourselves.
                    std::thread::sleep(Duration::from_millis(10));
                }
            }

            if self.cancel_requested.load(Ordering::SeqCst) {
                let _ = child.kill();
                aborted = Some((FailureKind::Cancelled, "Run cancelled".to_string()));
                break;
            }

            if let Some(limit) = timeout {
                if start.elapsed() >= limit {
                    let _ = child.kill();
                    aborted = Some((
                        FailureKind::Timeout,
                        format!("Timed out after {} seconds", limit.as_secs()),
                    ));
                    break;
                }
            }

            if exit_status.is_none() {
                match child.try_wait() {
                    Ok(Some(status)) => exit_status = Some(status),
                    Ok(None) => {}
                    Err(e) => {
                        let _ = child.kill();
                        reap(&mut child);
                        return Err(RunnerError::Io(e));
                    }
                }
            }
            if exit_status.is_some() && readers_done {
                break;
            }
        }

        if aborted.is_some() {
            // Killed above; reap so the child does not linger as a zombie.
            reap(&mut child);
        } else if exit_status.is_none() {
            exit_status = child.wait().ok();
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = exit_status.and_then(|status| status.code());

        let (succeeded, failure, failure_kind) = match aborted {
            Some((kind, summary)) => {
                error!("{}: {}", spec.display_command(), summary);
                (false, Some(summary), Some(kind))
            }
            None => {
                if exit_code == Some(0) && !error_seen {
                    info!(
                        "'{}' completed successfully in {}ms",
                        spec.display_command(),
                        duration_ms
                    );
                    (true, None, None)
                } else if error_seen {
                    let summary = match lines.iter().find(|l| l.severity == Severity::Error) {
                        Some(line) => format!("Error output: {}", line.text),
                        None => "Error output detected".to_string(),
                    };
                    error!("'{}' failed: {}", spec.display_command(), summary);
                    (false, Some(summary), Some(FailureKind::ErrorOutput))
                } else {
                    let code = exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    let summary = format!("'{}' exited with code {}", spec.program, code);
                    error!("{}", summary);
                    (false, Some(summary), Some(FailureKind::NonZeroExit))
                }
            }
        };

        Ok(RunResult {
            spec: spec.clone(),
            exit_code,
            lines,
            succeeded,
            started_at,
            duration_ms,
            failure,
            failure_kind,
        })
    }
}

fn reap(child: &mut Child) {
    let _ = child.wait();
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> RunnerResult<RunResult> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RunnerError::Busy);
        }
        self.cancel_requested.store(false, Ordering::SeqCst);

        let result = self.execute(spec);

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }
}
