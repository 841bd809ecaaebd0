//! `forge analyze` - analyze CI/CD configuration artifacts.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use tracing::info;

use forge_analyzer::{AnalyzerPipeline, ReportStatus};

use crate::project;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Project root
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Emit the report as JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AnalyzeArgs) -> anyhow::Result<()> {
    let snapshot = project::load_snapshot(&args.path)?;
    info!("Analyzing {} project artifacts", snapshot.len());

    let pipeline = AnalyzerPipeline::with_default_rules();
    let report = pipeline.analyze(&snapshot);

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.to_markdown());
    }

    if report.status == ReportStatus::Fail {
        bail!("analysis found {} error issue(s)", report.errors);
    }
    Ok(())
}
