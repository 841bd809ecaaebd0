//! `forge fix` - apply mechanical fixes for detected issues.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use forge_analyzer::{AnalyzerPipeline, FixStatus};

use crate::project;

#[derive(Args)]
pub struct FixArgs {
    /// Project root
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Only apply fixes for these rules (or `rule:file` ids); repeatable
    #[arg(short, long)]
    pub rule: Vec<String>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: FixArgs) -> anyhow::Result<()> {
    let snapshot = project::load_snapshot(&args.path)?;
    let pipeline = AnalyzerPipeline::with_default_rules();

    let report = pipeline.analyze(&snapshot);
    if report.is_empty() {
        println!("No issues found.");
        return Ok(());
    }
    info!("Applying fixes for {} issue(s)", report.len());

    let selection = (!args.rule.is_empty()).then_some(args.rule.as_slice());
    let (fixed, outcomes) = pipeline.apply_fixes(&snapshot, &report, selection);

    for outcome in &outcomes {
        let status = match &outcome.status {
            FixStatus::Applied => "applied".to_string(),
            FixStatus::Skipped => "skipped (no-op)".to_string(),
            FixStatus::Failed(reason) => format!("failed: {reason}"),
        };
        println!("{:<28} {:<32} {}", outcome.rule, outcome.file, status);
    }

    let changed = fixed.changed_since(&snapshot);
    if args.dry_run {
        println!("[DRY-RUN] Would rewrite {} artifact(s)", changed.len());
        return Ok(());
    }

    let written = project::write_changes(&args.path, &snapshot, &fixed)?;
    println!("Rewrote {} artifact(s)", written.len());

    // Verification is a separate pass over the fixed snapshot.
    let confirmation = pipeline.analyze(&fixed);
    println!(
        "Remaining issues: {} (was {})",
        confirmation.len(),
        report.len()
    );
    Ok(())
}
