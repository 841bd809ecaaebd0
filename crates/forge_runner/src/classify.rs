//! Output line classification.
//!
//! Every line a toolchain prints is mapped to a severity bucket as it
//! arrives. The pattern set is data, not code: `ClassifierConfig` can be
//! loaded from configuration and extended without touching the matcher.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

/// Severity of a single output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// One ordered classification rule.
///
/// A rule fires when any of its case-insensitive substrings or any of its
/// regexes matches the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub severity: Severity,
    /// Case-insensitive substrings.
    #[serde(default)]
    pub contains: Vec<String>,
    /// Regular expressions, matched against the raw line.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl PatternRule {
    pub fn contains(severity: Severity, needles: &[&str]) -> Self {
        Self {
            severity,
            contains: needles.iter().map(|s| s.to_string()).collect(),
            patterns: Vec::new(),
        }
    }
}

/// Ordered rule set for the classifier. Evaluation is first-match-wins, so
/// error rules must come before warning rules: a line matching both classes
/// is an error, because downstream logic treats any error line as run
/// failure even on exit code 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub rules: Vec<PatternRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                PatternRule::contains(
                    Severity::Error,
                    &["error:", "failed:", "exception:", "could not", "cannot ", "undefined"],
                ),
                PatternRule::contains(Severity::Warning, &["warning"]),
                PatternRule::contains(
                    Severity::Success,
                    &["succeeded", "build complete", "all tests passed"],
                ),
            ],
        }
    }
}

impl ClassifierConfig {
    /// Prepend extra rules ahead of the defaults, keeping bucket order.
    pub fn with_rules(mut self, rules: Vec<PatternRule>) -> Self {
        let mut combined = rules;
        combined.append(&mut self.rules);
        self.rules = combined;
        self
    }
}

#[derive(Debug)]
struct CompiledRule {
    severity: Severity,
    contains: Vec<String>,
    regexes: Vec<Regex>,
}

/// Maps a line of process output to a [`Severity`].
///
/// Total and deterministic: a line that matches no rule is `Info`.
#[derive(Debug)]
pub struct OutputClassifier {
    rules: Vec<CompiledRule>,
}

impl OutputClassifier {
    /// Compile a configuration into a classifier.
    pub fn new(config: &ClassifierConfig) -> RunnerResult<Self> {
        let mut rules = Vec::with_capacity(config.rules.len());
        for rule in &config.rules {
            let mut regexes = Vec::with_capacity(rule.patterns.len());
            for pattern in &rule.patterns {
                let regex = Regex::new(pattern).map_err(|e| RunnerError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                regexes.push(regex);
            }
            rules.push(CompiledRule {
                severity: rule.severity,
                contains: rule.contains.iter().map(|s| s.to_lowercase()).collect(),
                regexes,
            });
        }
        Ok(Self { rules })
    }

    /// Classifier with the built-in pattern set.
    pub fn with_defaults() -> Self {
        let config = ClassifierConfig::default();
        let rules = config
            .rules
            .iter()
            .map(|rule| CompiledRule {
                severity: rule.severity,
                contains: rule.contains.iter().map(|s| s.to_lowercase()).collect(),
                regexes: Vec::new(),
            })
            .collect();
        Self { rules }
    }

    /// Classify one line. First matching rule wins.
    pub fn classify(&self, line: &str) -> Severity {
        let lower = line.to_lowercase();
        for rule in &self.rules {
            if rule.contains.iter().any(|needle| lower.contains(needle))
                || rule.regexes.iter().any(|regex| regex.is_match(line))
            {
                return rule.severity;
            }
        }
        Severity::Info
    }
}

impl Default for OutputClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buckets() {
        let classifier = OutputClassifier::with_defaults();

        assert_eq!(classifier.classify("error: something broke"), Severity::Error);
        assert_eq!(classifier.classify("warning: deprecated API"), Severity::Warning);
        assert_eq!(classifier.classify("Build complete!"), Severity::Success);
        assert_eq!(classifier.classify("Compiling lib/main.dart"), Severity::Info);
    }

    #[test]
    fn test_error_takes_precedence_over_warning() {
        let classifier = OutputClassifier::with_defaults();
        // A line carrying both keyword classes must classify as error.
        assert_eq!(
            classifier.classify("warning: error: conflicting directives"),
            Severity::Error
        );
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = OutputClassifier::with_defaults();
        assert_eq!(classifier.classify("ERROR: out of memory"), Severity::Error);
        assert_eq!(classifier.classify("WARNING deprecated"), Severity::Warning);
    }

    #[test]
    fn test_total_and_deterministic() {
        let classifier = OutputClassifier::with_defaults();
        for line in ["", "  ", "plain output", "42", "error: x"] {
            assert_eq!(classifier.classify(line), classifier.classify(line));
        }
        assert_eq!(classifier.classify(""), Severity::Info);
    }

    #[test]
    fn test_regex_rules() {
        let config = ClassifierConfig::default().with_rules(vec![PatternRule {
            severity: Severity::Error,
            contains: Vec::new(),
            patterns: vec![r"^E\d{4}:".to_string()],
        }]);
        let classifier = OutputClassifier::new(&config).unwrap();

        assert_eq!(classifier.classify("E0308: mismatched types"), Severity::Error);
        assert_eq!(classifier.classify("note: E0308 explained"), Severity::Info);
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let config = ClassifierConfig::default().with_rules(vec![PatternRule {
            severity: Severity::Error,
            contains: Vec::new(),
            patterns: vec!["(unclosed".to_string()],
        }]);

        let err = OutputClassifier::new(&config).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidPattern { .. }));
    }
}
