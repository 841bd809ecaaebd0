//! Issue rules over project snapshots.
//!
//! Each rule is a stateless predicate over the read-only [`Snapshot`]. Rules
//! never touch the filesystem and never abort the pipeline: an evaluation
//! error is downgraded by the pipeline to an error-severity issue naming the
//! rule.

use crate::error::AnalyzerResult;
use crate::issue::Issue;
use crate::snapshot::Snapshot;

pub mod manifest;
pub mod security;
pub mod workflow;

pub use manifest::{
    BuildRunnerRule, HeavyDependencyRule, ImageCachingRule, LintsRule, SdkConstraintRule,
    TestDependencyRule,
};
pub use security::HardcodedSecretRule;
pub use workflow::{
    ArtifactUploadRule, CacheRule, ErrorHandlingRule, JobTimeoutRule, WorkflowSyntaxRule,
};

/// A named check that yields zero or more issues for a snapshot.
pub trait IssueRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>>;
}

/// The standard rule set, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn IssueRule>> {
    vec![
        Box::new(WorkflowSyntaxRule),
        Box::new(JobTimeoutRule),
        Box::new(CacheRule),
        Box::new(ErrorHandlingRule),
        Box::new(ArtifactUploadRule),
        Box::new(SdkConstraintRule),
        Box::new(LintsRule),
        Box::new(TestDependencyRule),
        Box::new(BuildRunnerRule),
        Box::new(ImageCachingRule),
        Box::new(HeavyDependencyRule),
        Box::new(HardcodedSecretRule::default()),
    ]
}

/// Rejoin edited lines, keeping the original's trailing-newline shape.
pub(crate) fn rejoin(original: &str, lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    if original.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Leading whitespace of a line.
pub(crate) fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
