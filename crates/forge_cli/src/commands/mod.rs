//! CLI command definitions.
//!
//! This module defines the command structure for the BuildForge CLI.
//! Each subcommand maps to one workflow of the tool.

use clap::{Parser, Subcommand};

pub mod analyze;
pub mod fix;
pub mod history;
pub mod metrics;
pub mod run;

/// BuildForge - build automation and CI/CD analysis
#[derive(Parser)]
#[command(name = "forge")]
#[command(version, about = "BuildForge - build automation and CI/CD analysis")]
#[command(long_about = r#"
BuildForge runs a toolchain's build/test/lint commands, classifies their
output as it streams, tracks run metrics over time, and analyzes CI/CD
configuration artifacts for structural issues it can mechanically fix.

COMMANDS:
  run       → Execute a configured task (build, test, analyze, ...)
  analyze   → Analyze CI/CD artifacts and report issues
  fix       → Apply mechanical fixes and re-analyze
  metrics   → Show aggregated run metrics
  history   → List recent runs

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Run or analysis failure
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a configured toolchain task
    Run(run::RunArgs),

    /// Analyze CI/CD configuration artifacts
    Analyze(analyze::AnalyzeArgs),

    /// Apply mechanical fixes for detected issues
    Fix(fix::FixArgs),

    /// Show aggregated run metrics
    Metrics(metrics::MetricsArgs),

    /// List recent runs
    History(history::HistoryArgs),
}
