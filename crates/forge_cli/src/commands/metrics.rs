//! `forge metrics` - show aggregated run metrics.

use std::path::PathBuf;

use clap::Args;

use crate::config::ForgeConfig;
use crate::persist;

#[derive(Args)]
pub struct MetricsArgs {
    /// Project root
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Configuration file (defaults to forge.yaml under the project root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit metrics as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: MetricsArgs) -> anyhow::Result<()> {
    let config = ForgeConfig::load(&args.path, args.config.as_deref())?;
    let store = persist::load(&args.path.join(&config.history_path), config.retention)?;
    let metrics = store.metrics();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("Build Metrics");
    println!("  Total Runs:   {}", metrics.total);
    println!("  Successful:   {}", metrics.succeeded);
    println!("  Failed:       {}", metrics.failed);
    println!("  Success Rate: {:.1}%", metrics.success_rate);
    println!("  Avg Time:     {:.1}s", metrics.avg_duration_seconds);
    if let Some(last) = metrics.last_run_at {
        println!("  Last Run:     {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !metrics.targets.is_empty() {
        println!("  Per Target:");
        for (label, stats) in &metrics.targets {
            println!("    {:<10} {}/{}", label, stats.succeeded, stats.total);
        }
    }
    Ok(())
}
