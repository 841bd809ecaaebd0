//! Security rules over source artifacts.

use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::fix::Fix;
use crate::issue::{Issue, IssueSeverity};
use crate::rules::IssueRule;
use crate::snapshot::Snapshot;

/// Credential assignments with a quoted literal value. The value class
/// excludes a leading `*` so redacted artifacts do not match again.
const DEFAULT_PATTERNS: [&str; 5] = [
    r#"(?i)(password)(\s*[:=]\s*)["']([^"'*][^"']*)["']"#,
    r#"(?i)(api[_-]?key)(\s*[:=]\s*)["']([^"'*][^"']*)["']"#,
    r#"(?i)(secret)(\s*[:=]\s*)["']([^"'*][^"']*)["']"#,
    r#"(?i)(token)(\s*[:=]\s*)["']([^"'*][^"']*)["']"#,
    r#"(?i)(private[_-]?key)(\s*[:=]\s*)["']([^"'*][^"']*)["']"#,
];

/// Flags hardcoded credential literals in source artifacts and redacts them.
pub struct HardcodedSecretRule {
    patterns: Vec<String>,
}

impl HardcodedSecretRule {
    /// Rule with custom patterns. Each pattern must capture the key, the
    /// assignment operator, and the literal value, in that order.
    pub fn with_patterns(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    fn compile(&self) -> AnalyzerResult<Vec<Regex>> {
        self.patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| AnalyzerError::RuleEvaluation {
                    rule: "hardcoded_secret".to_string(),
                    message: format!("invalid pattern '{pattern}': {e}"),
                })
            })
            .collect()
    }
}

impl Default for HardcodedSecretRule {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

fn redact(regexes: &[Regex], content: &str) -> String {
    let mut out = content.to_string();
    for regex in regexes {
        out = regex.replace_all(&out, "${1}${2}\"***\"").into_owned();
    }
    out
}

impl IssueRule for HardcodedSecretRule {
    fn name(&self) -> &'static str {
        "hardcoded_secret"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let regexes = Arc::new(self.compile()?);

        let mut issues = Vec::new();
        for (name, content) in snapshot.files_with_extension("dart") {
            if regexes.iter().any(|regex| regex.is_match(content)) {
                warn!(file = name, "Credential literal found");
                let fix_regexes = Arc::clone(&regexes);
                issues.push(
                    Issue::new(
                        self.name(),
                        IssueSeverity::Error,
                        format!("Sensitive data pattern found in {name}"),
                        name,
                    )
                    .with_fix(Fix::new("Redact hardcoded credential literals", {
                        move |content: &str| redact(&fix_regexes, content)
                    })),
                );
            }
        }
        Ok(issues)
    }
}
