//! `forge run` - execute a configured toolchain task.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::Args;
use tracing::info;

use forge_runner::{
    CommandRunner, CommandSpec, OutputClassifier, ProcessRunner, RunResult, TargetKind,
};

use crate::config::ForgeConfig;
use crate::persist;

#[derive(Args)]
pub struct RunArgs {
    /// Task name from the configuration (e.g. build, test, analyze)
    pub task: String,

    /// Target platform label recorded with this run
    #[arg(short, long, default_value = "host")]
    pub target: String,

    /// Kill the run on the first error-classified output line
    #[arg(long)]
    pub fail_fast: bool,

    /// Wall-clock limit in seconds, overriding the task configuration
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Project root
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Configuration file (defaults to forge.yaml under the project root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = ForgeConfig::load(&args.path, args.config.as_deref())?;
    let target: TargetKind = args
        .target
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let mut spec = config.command_spec(&args.task, &args.path, target)?;
    if args.fail_fast {
        spec = spec.fail_fast(true);
    }
    if let Some(seconds) = args.timeout {
        spec = spec.timeout_seconds(seconds);
    }

    let classifier = OutputClassifier::new(&config.classifier_config())?;
    let runner = ProcessRunner::new(classifier).with_observer(Arc::new(|line| {
        println!("[{:>7}] {}", line.severity, line.text);
    }));

    info!("Running task '{}' for target {}", args.task, target);
    let result = run_and_record(&runner, &spec, &config, &args.path).await?;

    print_summary(&result);
    if !result.succeeded {
        bail!(
            "run failed: {}",
            result
                .failure
                .as_deref()
                .unwrap_or("no failure summary recorded")
        );
    }
    Ok(())
}

/// Execute the spec and append the outcome to the persisted history.
async fn run_and_record(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    config: &ForgeConfig,
    root: &Path,
) -> anyhow::Result<RunResult> {
    let result = runner.run(spec).await?;

    let history_path = root.join(&config.history_path);
    let mut store = persist::load(&history_path, config.retention)?;
    store.append(result.clone(), spec.target.label());
    persist::save(&history_path, &store)?;

    Ok(result)
}

fn print_summary(result: &RunResult) {
    let status = if result.succeeded { "OK" } else { "FAILED" };
    println!();
    println!(
        "{} {} in {:.1}s ({} lines, {} errors, {} warnings)",
        status,
        result.spec.display_command(),
        result.duration_seconds(),
        result.lines.len(),
        result.count_at(forge_runner::Severity::Error),
        result.count_at(forge_runner::Severity::Warning),
    );
    if let Some(failure) = &result.failure {
        println!("  {failure}");
    }
}
