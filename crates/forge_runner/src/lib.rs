//! # forge_runner
//!
//! Streaming toolchain command execution for BuildForge.
//!
//! This crate owns the process lifecycle: it spawns an external command,
//! classifies each output line into a severity bucket while the process is
//! still running, and returns a structured [`RunResult`].
//!
//! # Architecture
//!
//! - **OutputClassifier**: ordered first-match-wins pattern rules over lines
//! - **CommandSpec**: immutable description of one command invocation
//! - **ProcessRunner**: single-flight execution with streaming, timeout,
//!   cancellation, and optional fail-fast on error output
//! - **MockCommandRunner**: scripted runner for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_runner::{CommandRunner, CommandSpec, OutputClassifier, ProcessRunner, TargetKind};
//!
//! let runner = ProcessRunner::new(OutputClassifier::with_defaults());
//! let spec = CommandSpec::new("flutter")
//!     .args(["build", "apk"])
//!     .target(TargetKind::Android)
//!     .timeout_seconds(600);
//!
//! let result = runner.run(&spec).await?;
//! println!("succeeded: {}", result.succeeded);
//! ```

pub mod classify;
pub mod error;
pub mod mock;
pub mod process;
pub mod runner;
pub mod spec;

// Re-export main types for convenience
pub use classify::{ClassifierConfig, OutputClassifier, PatternRule, Severity};
pub use error::{RunnerError, RunnerResult};
pub use mock::{MockCommandRunner, ScriptedRun};
pub use process::ProcessRunner;
pub use runner::{
    CommandRunner, FailureKind, LineObserver, LineSource, OutputLine, RunResult,
};
pub use spec::{CommandSpec, TargetKind};
