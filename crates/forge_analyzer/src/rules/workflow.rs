//! Rules over CI workflow definitions.
//!
//! These are shallow, line-oriented checks: the fixes are mechanical edits
//! that remove exactly the condition the rule detects, so a fixed artifact
//! never re-reports and re-applying a fix is a no-op.

use tracing::debug;

use crate::error::AnalyzerResult;
use crate::fix::Fix;
use crate::issue::{Issue, IssueSeverity};
use crate::rules::{indent_of, rejoin, IssueRule};
use crate::snapshot::Snapshot;

/// Flags workflow artifacts that are not valid YAML.
pub struct WorkflowSyntaxRule;

impl IssueRule for WorkflowSyntaxRule {
    fn name(&self) -> &'static str {
        "workflow_unparseable"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let mut issues = Vec::new();
        for (name, content) in snapshot.workflow_files() {
            if let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(content) {
                issues.push(Issue::new(
                    self.name(),
                    IssueSeverity::Error,
                    format!("Workflow is not valid YAML: {e}"),
                    name,
                ));
            }
        }
        Ok(issues)
    }
}

/// Flags workflows whose jobs have no `timeout-minutes`.
pub struct JobTimeoutRule;

fn add_job_timeouts(content: &str) -> String {
    if content.contains("timeout-minutes:") {
        return content.to_string();
    }
    let mut lines = Vec::new();
    for line in content.lines() {
        lines.push(line.to_string());
        if line.trim_start().starts_with("runs-on:") {
            lines.push(format!("{}timeout-minutes: 30", indent_of(line)));
        }
    }
    rejoin(content, lines)
}

impl IssueRule for JobTimeoutRule {
    fn name(&self) -> &'static str {
        "timeout_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let mut issues = Vec::new();
        for (name, content) in snapshot.workflow_files() {
            let has_anchor = content
                .lines()
                .any(|line| line.trim_start().starts_with("runs-on:"));
            if has_anchor && !content.contains("timeout-minutes:") {
                issues.push(
                    Issue::new(
                        self.name(),
                        IssueSeverity::Warning,
                        "No timeout specified for jobs",
                        name,
                    )
                    .with_fix(Fix::new("Add timeout-minutes: 30 to all jobs", add_job_timeouts)),
                );
            }
        }
        Ok(issues)
    }
}

/// Flags workflows that set up a toolchain without dependency caching.
pub struct CacheRule;

fn is_setup_action(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.contains("uses:")
        && (trimmed.contains("flutter-action") || trimmed.contains("actions/setup-"))
}

fn step_key_indent(line: &str) -> usize {
    let ws = indent_of(line).len();
    if line.trim_start().starts_with("- ") {
        ws + 2
    } else {
        ws
    }
}

fn add_setup_cache(content: &str) -> String {
    if content.contains("cache:") {
        return content.to_string();
    }
    let raw: Vec<&str> = content.lines().collect();
    let mut lines: Vec<String> = Vec::with_capacity(raw.len() + 2);
    let mut i = 0;
    while i < raw.len() {
        let line = raw[i];
        lines.push(line.to_string());
        if is_setup_action(line) {
            let key_indent = step_key_indent(line);
            let next_is_with = raw
                .get(i + 1)
                .map(|next| next.trim_start() == "with:")
                .unwrap_or(false);
            if next_is_with {
                let with_line = raw[i + 1];
                lines.push(with_line.to_string());
                lines.push(format!("{}  cache: true", indent_of(with_line)));
                i += 2;
                continue;
            }
            lines.push(format!("{}with:", " ".repeat(key_indent)));
            lines.push(format!("{}cache: true", " ".repeat(key_indent + 2)));
        }
        i += 1;
    }
    rejoin(content, lines)
}

impl IssueRule for CacheRule {
    fn name(&self) -> &'static str {
        "cache_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let mut issues = Vec::new();
        for (name, content) in snapshot.workflow_files() {
            let has_setup = content.lines().any(is_setup_action);
            if has_setup && !content.contains("cache:") {
                debug!(workflow = name, "Setup action without caching");
                issues.push(
                    Issue::new(
                        self.name(),
                        IssueSeverity::Warning,
                        "No caching configured",
                        name,
                    )
                    .with_fix(Fix::new(
                        "Enable toolchain caching to speed up builds",
                        add_setup_cache,
                    )),
                );
            }
        }
        Ok(issues)
    }
}

/// Flags workflows with no error handling at all.
pub struct ErrorHandlingRule;

fn add_continue_on_error(content: &str) -> String {
    if content.contains("continue-on-error:") {
        return content.to_string();
    }
    let mut lines = Vec::new();
    for line in content.lines() {
        if line.trim() == "steps:" {
            lines.push(format!("{}continue-on-error: true", indent_of(line)));
        }
        lines.push(line.to_string());
    }
    rejoin(content, lines)
}

impl IssueRule for ErrorHandlingRule {
    fn name(&self) -> &'static str {
        "error_handling_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let mut issues = Vec::new();
        for (name, content) in snapshot.workflow_files() {
            let has_steps = content.lines().any(|line| line.trim() == "steps:");
            if has_steps
                && !content.contains("continue-on-error:")
                && !content.contains("if: failure()")
            {
                issues.push(
                    Issue::new(
                        self.name(),
                        IssueSeverity::Error,
                        "No error handling in workflow",
                        name,
                    )
                    .with_fix(Fix::new(
                        "Add continue-on-error to jobs with steps",
                        add_continue_on_error,
                    )),
                );
            }
        }
        Ok(issues)
    }
}

/// Flags workflows that build without uploading the result.
pub struct ArtifactUploadRule;

fn add_artifact_upload(content: &str) -> String {
    if content.contains("actions/upload-artifact") {
        return content.to_string();
    }
    let raw: Vec<&str> = content.lines().collect();
    let Some(build_index) = raw.iter().position(|line| line.contains("flutter build")) else {
        return content.to_string();
    };

    // Indent of the step list the build command belongs to.
    let dash_indent = raw[..=build_index]
        .iter()
        .rev()
        .find(|line| line.trim_start().starts_with("- "))
        .map(|line| indent_of(line).to_string())
        .unwrap_or_else(|| "      ".to_string());

    // Insert after the last line of the build step.
    let mut insert_at = raw.len();
    for (i, line) in raw.iter().enumerate().skip(build_index + 1) {
        if line.trim().is_empty() {
            continue;
        }
        let starts_new_step =
            line.trim_start().starts_with("- ") && indent_of(line) == dash_indent;
        let dedents = indent_of(line).len() < dash_indent.len();
        if starts_new_step || dedents {
            insert_at = i;
            break;
        }
    }

    let step = [
        format!("{dash_indent}- name: Upload build artifacts"),
        format!("{dash_indent}  uses: actions/upload-artifact@v4"),
        format!("{dash_indent}  with:"),
        format!("{dash_indent}    name: build-artifacts"),
        format!("{dash_indent}    path: build/"),
        format!("{dash_indent}    retention-days: 30"),
    ];

    let mut lines: Vec<String> = raw[..insert_at].iter().map(|s| s.to_string()).collect();
    lines.extend(step);
    lines.extend(raw[insert_at..].iter().map(|s| s.to_string()));
    rejoin(content, lines)
}

impl IssueRule for ArtifactUploadRule {
    fn name(&self) -> &'static str {
        "artifact_upload_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let mut issues = Vec::new();
        for (name, content) in snapshot.workflow_files() {
            let builds = content.lines().any(|line| line.contains("flutter build"));
            if builds && !content.contains("actions/upload-artifact") {
                issues.push(
                    Issue::new(
                        self.name(),
                        IssueSeverity::Warning,
                        "No artifact upload configured",
                        name,
                    )
                    .with_fix(Fix::new(
                        "Upload build results as a workflow artifact",
                        add_artifact_upload,
                    )),
                );
            }
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = "\
name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: subosito/flutter-action@v2
      - run: flutter build apk
";

    fn snapshot() -> Snapshot {
        Snapshot::new().with_file(".github/workflows/ci.yml", WORKFLOW)
    }

    #[test]
    fn test_syntax_rule_flags_bad_yaml() {
        let snapshot =
            Snapshot::new().with_file(".github/workflows/ci.yml", "jobs:\n  build: [unclosed");
        let issues = WorkflowSyntaxRule.evaluate(&snapshot).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Error);
        assert!(issues[0].fix.is_none());
    }

    #[test]
    fn test_syntax_rule_accepts_valid_yaml() {
        assert!(WorkflowSyntaxRule.evaluate(&snapshot()).unwrap().is_empty());
    }

    #[test]
    fn test_timeout_rule_detects_and_fixes() {
        let issues = JobTimeoutRule.evaluate(&snapshot()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "timeout_missing");

        let fix = issues[0].fix.as_ref().unwrap();
        let fixed = fix.apply(WORKFLOW);
        assert!(fixed.contains("    timeout-minutes: 30"));
        // Inserted right under runs-on, at the same indent.
        let runs_on = fixed.lines().position(|l| l.contains("runs-on:")).unwrap();
        assert!(fixed.lines().nth(runs_on + 1).unwrap().contains("timeout-minutes"));

        // Idempotent, and the fixed artifact no longer reports.
        assert_eq!(fix.apply(&fixed), fixed);
        let snapshot = Snapshot::new().with_file(".github/workflows/ci.yml", fixed);
        assert!(JobTimeoutRule.evaluate(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_timeout_rule_needs_anchor() {
        let snapshot = Snapshot::new().with_file(".github/workflows/ci.yml", "name: CI\n");
        assert!(JobTimeoutRule.evaluate(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_cache_rule_adds_with_block() {
        let issues = CacheRule.evaluate(&snapshot()).unwrap();
        assert_eq!(issues.len(), 1);

        let fixed = issues[0].fix.as_ref().unwrap().apply(WORKFLOW);
        let lines: Vec<&str> = fixed.lines().collect();
        let setup = lines.iter().position(|l| l.contains("flutter-action")).unwrap();
        assert_eq!(lines[setup + 1].trim(), "with:");
        assert_eq!(lines[setup + 2].trim(), "cache: true");

        let snapshot = Snapshot::new().with_file(".github/workflows/ci.yml", fixed);
        assert!(CacheRule.evaluate(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_cache_rule_reuses_existing_with_block() {
        let workflow = "\
jobs:
  build:
    steps:
      - uses: subosito/flutter-action@v2
        with:
          channel: stable
";
        let fixed = add_setup_cache(workflow);
        let lines: Vec<&str> = fixed.lines().collect();
        let with = lines.iter().position(|l| l.trim() == "with:").unwrap();
        assert_eq!(lines[with + 1].trim(), "cache: true");
        assert_eq!(fixed.matches("with:").count(), 1);
        assert_eq!(add_setup_cache(&fixed), fixed);
    }

    #[test]
    fn test_error_handling_rule() {
        let issues = ErrorHandlingRule.evaluate(&snapshot()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Error);

        let fixed = issues[0].fix.as_ref().unwrap().apply(WORKFLOW);
        let lines: Vec<&str> = fixed.lines().collect();
        let steps = lines.iter().position(|l| l.trim() == "steps:").unwrap();
        assert_eq!(lines[steps - 1].trim(), "continue-on-error: true");
        assert_eq!(indent_of(lines[steps - 1]), indent_of(lines[steps]));

        let snapshot = Snapshot::new().with_file(".github/workflows/ci.yml", fixed);
        assert!(ErrorHandlingRule.evaluate(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_error_handling_rule_accepts_failure_conditions() {
        let workflow = "steps:\n  - run: flutter test\n    if: failure()\n";
        let snapshot = Snapshot::new().with_file(".github/workflows/ci.yml", workflow);
        assert!(ErrorHandlingRule.evaluate(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_artifact_upload_rule_appends_step() {
        let issues = ArtifactUploadRule.evaluate(&snapshot()).unwrap();
        assert_eq!(issues.len(), 1);

        let fixed = issues[0].fix.as_ref().unwrap().apply(WORKFLOW);
        assert!(fixed.contains("actions/upload-artifact@v4"));
        let lines: Vec<&str> = fixed.lines().collect();
        let build = lines.iter().position(|l| l.contains("flutter build")).unwrap();
        assert!(lines[build + 1].contains("Upload build artifacts"));
        assert_eq!(indent_of(lines[build + 1]), "      ");

        assert_eq!(add_artifact_upload(&fixed), fixed);
        let snapshot = Snapshot::new().with_file(".github/workflows/ci.yml", fixed);
        assert!(ArtifactUploadRule.evaluate(&snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_rules_ignore_non_workflow_files() {
        let snapshot = Snapshot::new().with_file("pubspec.yaml", "name: app\n");
        assert!(JobTimeoutRule.evaluate(&snapshot).unwrap().is_empty());
        assert!(CacheRule.evaluate(&snapshot).unwrap().is_empty());
        assert!(ArtifactUploadRule.evaluate(&snapshot).unwrap().is_empty());
    }
}
