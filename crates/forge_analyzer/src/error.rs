//! Error types for the analyzer module.

use thiserror::Error;

/// Result type alias for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur during analyzer operations.
///
/// A rule evaluation error is data, not a fault: the pipeline downgrades it
/// to an error-severity issue naming the rule instead of aborting.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Rule evaluation failed: {rule} - {message}")]
    RuleEvaluation { rule: String, message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
