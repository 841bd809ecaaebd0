//! `forge history` - list recent runs.

use std::path::PathBuf;

use clap::Args;

use crate::config::ForgeConfig;
use crate::persist;

#[derive(Args)]
pub struct HistoryArgs {
    /// Project root
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Configuration file (defaults to forge.yaml under the project root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of runs to list, newest first
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

pub async fn execute(args: HistoryArgs) -> anyhow::Result<()> {
    let config = ForgeConfig::load(&args.path, args.config.as_deref())?;
    let store = persist::load(&args.path.join(&config.history_path), config.retention)?;

    let recent = store.recent(args.limit);
    if recent.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    for result in recent {
        let status = if result.succeeded { "ok  " } else { "FAIL" };
        println!(
            "{} {} {:>7.1}s {:<8} {}",
            status,
            result.started_at.format("%Y-%m-%d %H:%M:%S"),
            result.duration_seconds(),
            result.spec.target.label(),
            result.spec.display_command(),
        );
        if let Some(failure) = &result.failure {
            println!("       {failure}");
        }
    }
    Ok(())
}
