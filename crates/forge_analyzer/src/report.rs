//! Analysis reports.

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerResult;
use crate::issue::{Issue, IssueSeverity};

/// Overall report status: `Fail` if any error-severity issue exists, else
/// `Warn` if any warning exists, else `Pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Ordered issues plus summary counts for one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    issues: Vec<Issue>,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub status: ReportStatus,
}

impl Report {
    pub fn new(issues: Vec<Issue>) -> Self {
        let errors = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count();
        let warnings = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count();
        let infos = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Info)
            .count();
        let status = if errors > 0 {
            ReportStatus::Fail
        } else if warnings > 0 {
            ReportStatus::Warn
        } else {
            ReportStatus::Pass
        };
        Self {
            issues,
            errors,
            warnings,
            infos,
            status,
        }
    }

    /// Issues in rule registration order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Issues produced by one rule.
    pub fn issues_for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues.iter().filter(move |issue| issue.rule == rule)
    }

    /// Human-readable rendering.
    pub fn to_markdown(&self) -> String {
        let mut out = Vec::new();
        out.push("# CI/CD Analysis Report".to_string());
        out.push(String::new());
        out.push("## Summary".to_string());
        out.push(format!("Status: {}", self.status));
        out.push(format!("Total Issues Found: {}", self.issues.len()));
        out.push(format!(
            "Errors: {} | Warnings: {} | Info: {}",
            self.errors, self.warnings, self.infos
        ));
        out.push(String::new());

        if !self.issues.is_empty() {
            out.push("## Issues Found".to_string());
            for (i, issue) in self.issues.iter().enumerate() {
                out.push(format!(
                    "{}. **{}** [{}] - {}",
                    i + 1,
                    issue.severity.to_string().to_uppercase(),
                    issue.rule,
                    issue.description
                ));
                let file = if issue.file.is_empty() { "-" } else { &issue.file };
                out.push(format!("   Location: {file}"));
                if let Some(fix) = &issue.fix {
                    out.push(format!("   Fix: {}", fix.summary()));
                }
                out.push(String::new());
            }
        }

        out.join("\n")
    }

    /// Machine-readable rendering.
    pub fn to_json(&self) -> AnalyzerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
