//! Analyzer pipeline: ordered rule evaluation and fix application.

use tracing::{debug, warn};

use crate::fix::{FixOutcome, FixStatus};
use crate::issue::{Issue, IssueSeverity};
use crate::report::Report;
use crate::rules::{default_rules, IssueRule};
use crate::snapshot::Snapshot;

/// Runs an ordered set of [`IssueRule`]s over a snapshot and, on request,
/// applies the resulting fixes one artifact at a time.
///
/// Analysis and fix application are deliberately separate steps: after
/// `apply_fixes` the caller re-runs `analyze` on the new snapshot to confirm
/// resolution, so both halves stay independently inspectable.
pub struct AnalyzerPipeline {
    rules: Vec<Box<dyn IssueRule>>,
}

impl AnalyzerPipeline {
    /// An empty pipeline. Rules run in registration order.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Pipeline with the standard rule set.
    pub fn with_default_rules() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    pub fn register(&mut self, rule: Box<dyn IssueRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Evaluate every rule against the snapshot.
    ///
    /// A rule that fails to evaluate becomes a single error-severity issue
    /// naming the rule; one broken rule never blocks the others.
    pub fn analyze(&self, snapshot: &Snapshot) -> Report {
        let mut issues = Vec::new();
        for rule in &self.rules {
            match rule.evaluate(snapshot) {
                Ok(found) => {
                    debug!(rule = rule.name(), count = found.len(), "Rule evaluated");
                    issues.extend(found);
                }
                Err(e) => {
                    warn!(rule = rule.name(), "Rule evaluation failed: {e}");
                    issues.push(Issue::new(
                        rule.name(),
                        IssueSeverity::Error,
                        format!("Rule evaluation failed: {e}"),
                        "",
                    ));
                }
            }
        }
        Report::new(issues)
    }

    /// Apply the fixes carried by the report's issues, sequentially in
    /// report order, returning the new snapshot and a per-issue outcome.
    ///
    /// `selection` filters by issue id (`rule:file`) or bare rule name; with
    /// `None` every fixable issue is applied. The input snapshot is left
    /// untouched, so every fix stays revertible from the pre-fix content. A
    /// failing fix does not block the ones after it.
    pub fn apply_fixes(
        &self,
        snapshot: &Snapshot,
        report: &Report,
        selection: Option<&[String]>,
    ) -> (Snapshot, Vec<FixOutcome>) {
        let mut next = snapshot.clone();
        let mut outcomes = Vec::new();

        for issue in report.issues() {
            let Some(fix) = &issue.fix else { continue };
            if let Some(selected) = selection {
                let wanted = selected
                    .iter()
                    .any(|s| *s == issue.id() || *s == issue.rule);
                if !wanted {
                    continue;
                }
            }

            let status = match next.get(&issue.file) {
                None => FixStatus::Failed(format!(
                    "artifact '{}' not present in snapshot",
                    issue.file
                )),
                Some(current) => {
                    let fixed = fix.apply(current);
                    if fixed == current {
                        FixStatus::Skipped
                    } else {
                        next.insert(issue.file.clone(), fixed);
                        FixStatus::Applied
                    }
                }
            };
            debug!(rule = %issue.rule, file = %issue.file, ?status, "Fix processed");
            outcomes.push(FixOutcome {
                rule: issue.rule.clone(),
                file: issue.file.clone(),
                status,
            });
        }

        (next, outcomes)
    }
}

impl Default for AnalyzerPipeline {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
