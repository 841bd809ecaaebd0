//! Detected issues.

use serde::{Deserialize, Serialize};

use crate::fix::Fix;

/// Severity of a detected issue. Ordered so `Error` compares greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One issue found by a rule evaluation. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    /// Name of the rule that produced this issue.
    pub rule: String,
    pub severity: IssueSeverity,
    pub description: String,
    /// Artifact the issue was found in; empty when no single artifact
    /// applies (e.g. a rule that failed to evaluate).
    pub file: String,
    /// Optional mechanical remediation, serialized as its summary text.
    #[serde(rename = "fix_suggestion")]
    pub fix: Option<Fix>,
}

impl Issue {
    pub fn new(
        rule: impl Into<String>,
        severity: IssueSeverity,
        description: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            description: description.into(),
            file: file.into(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Identifier used for fix selection: `rule:file`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.rule, self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(IssueSeverity::Error > IssueSeverity::Warning);
        assert!(IssueSeverity::Warning > IssueSeverity::Info);
    }

    #[test]
    fn test_serialized_field_names() {
        let issue = Issue::new(
            "timeout_missing",
            IssueSeverity::Warning,
            "No timeout specified for jobs",
            ".github/workflows/ci.yml",
        )
        .with_fix(Fix::new("Add timeout-minutes to all jobs", |c: &str| c.to_string()));

        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["rule"], "timeout_missing");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["file"], ".github/workflows/ci.yml");
        assert_eq!(json["fix_suggestion"], "Add timeout-minutes to all jobs");
        assert!(json["description"].is_string());
    }
}
