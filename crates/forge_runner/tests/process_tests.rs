//! Process execution tests.
//!
//! These spawn real child processes and are gated to unix, where `sh`,
//! `true`, and `sleep` are available.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use forge_runner::{
    CommandRunner, CommandSpec, FailureKind, OutputClassifier, ProcessRunner, RunnerError,
    Severity, TargetKind,
};

fn runner() -> ProcessRunner {
    ProcessRunner::new(OutputClassifier::with_defaults())
}

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").arg("-c").arg(script)
}

#[tokio::test]
async fn test_quiet_success() {
    // A command with no output and exit code 0.
    let result = runner().run(&CommandSpec::new("true")).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(result.exit_code, Some(0));
    assert!(result.lines.is_empty());
    assert!(result.failure.is_none());
    assert!(result.failure_kind.is_none());
}

#[tokio::test]
async fn test_error_line_overrides_zero_exit() {
    // Tools sometimes print "error:" and still exit 0; that is a failure.
    let result = runner()
        .run(&sh("echo 'error: something broke'; exit 0"))
        .await
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.failure_kind, Some(FailureKind::ErrorOutput));
    assert_eq!(result.error_lines().count(), 1);
    assert!(result.failure.as_deref().unwrap_or("").contains("something broke"));
}

#[tokio::test]
async fn test_nonzero_exit_without_error_output() {
    let result = runner().run(&sh("echo fine; exit 3")).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.failure_kind, Some(FailureKind::NonZeroExit));
}

#[tokio::test]
async fn test_timeout_kills_long_command() {
    let runner = runner();
    let spec = sh("sleep 10").timeout_seconds(1);

    let result = runner.run(&spec).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure_kind, Some(FailureKind::Timeout));
    assert!(result.failure.as_deref().unwrap_or("").contains("Timed out"));
    // Returned at approximately the deadline, not the sleep duration.
    assert!(result.duration_ms >= 900, "duration {}ms", result.duration_ms);
    assert!(result.duration_ms < 5_000, "duration {}ms", result.duration_ms);

    // The runner stays usable after a timeout.
    let again = runner.run(&CommandSpec::new("true")).await.unwrap();
    assert!(again.succeeded);
}

#[tokio::test]
async fn test_spawn_failure_is_a_failed_result() {
    let result = runner()
        .run(&CommandSpec::new("definitely-not-a-real-binary"))
        .await
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.failure_kind, Some(FailureKind::Spawn));
    assert!(result.failure.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_run_fails_fast_with_busy() {
    let runner = Arc::new(runner());

    let background = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run(&sh("sleep 5")).await })
    };
    tokio::time::sleep(Duration::from_millis(300)).await;

    let err = runner.run(&CommandSpec::new("true")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Busy));

    runner.cancel();
    let result = background.await.unwrap().unwrap();
    assert!(!result.succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_terminates_in_flight_run() {
    let runner = Arc::new(runner());

    let background = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run(&sh("echo started; sleep 10")).await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;
    runner.cancel();

    let result = background.await.unwrap().unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure_kind, Some(FailureKind::Cancelled));
    // Output captured before cancellation is retained.
    assert!(result.lines.iter().any(|l| l.text == "started"));
    assert!(result.duration_ms < 5_000);
}

#[tokio::test]
async fn test_fail_fast_stops_at_first_error_line() {
    let spec = sh("echo 'error: boom'; sleep 5; echo after").fail_fast(true);

    let result = runner().run(&spec).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.failure_kind, Some(FailureKind::ErrorOutput));
    assert!(result.lines.iter().any(|l| l.severity == Severity::Error));
    assert!(!result.lines.iter().any(|l| l.text == "after"));
    assert!(result.duration_ms < 3_000, "duration {}ms", result.duration_ms);
}

#[tokio::test]
async fn test_observer_sees_lines_in_arrival_order() {
    let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let runner = ProcessRunner::new(OutputClassifier::with_defaults()).with_observer(Arc::new(
        move |line| {
            sink.lock().unwrap().push((line.index, line.text.clone()));
        },
    ));

    let result = runner
        .run(&sh("echo one; echo two; echo three"))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), result.lines.len());
    for (position, (index, text)) in seen.iter().enumerate() {
        assert_eq!(*index, position);
        assert_eq!(*text, result.lines[position].text);
    }
}

#[tokio::test]
async fn test_stderr_interleaved_by_arrival() {
    let result = runner()
        .run(&sh("echo out; echo err 1>&2; sleep 0.2; echo late"))
        .await
        .unwrap();

    assert!(result.succeeded);
    let texts: Vec<&str> = result.lines.iter().map(|l| l.text.as_str()).collect();
    assert!(texts.contains(&"out"));
    assert!(texts.contains(&"err"));
    // The delayed stdout line arrives after the earlier stderr line.
    let err_pos = texts.iter().position(|t| *t == "err").unwrap();
    let late_pos = texts.iter().position(|t| *t == "late").unwrap();
    assert!(err_pos < late_pos);
}

#[tokio::test]
async fn test_stderr_capture_can_be_disabled() {
    let spec = sh("echo visible; echo hidden 1>&2").capture_stderr(false);

    let result = runner().run(&spec).await.unwrap();

    assert!(result.succeeded);
    let texts: Vec<&str> = result.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["visible"]);
}

#[tokio::test]
async fn test_env_and_cwd_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let spec = sh("pwd; echo $FORGE_PROBE")
        .cwd(dir.path())
        .env("FORGE_PROBE", "hello")
        .target(TargetKind::Linux);

    let result = runner().run(&spec).await.unwrap();

    assert!(result.succeeded);
    let texts: Vec<&str> = result.lines.iter().map(|l| l.text.as_str()).collect();
    assert!(texts[0].ends_with(
        dir.path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    ));
    assert!(texts.contains(&"hello"));
}
