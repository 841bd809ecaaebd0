//! Mechanical remediations.

use std::sync::Arc;

use serde::ser::Serializer;
use serde::Serialize;

/// Pure content transformation.
pub type FixFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A mechanical remediation paired with one issue.
///
/// The transformation is pure (no side effects of its own) and must be
/// idempotent: applying it to its own output returns the input unchanged.
#[derive(Clone)]
pub struct Fix {
    summary: String,
    transform: FixFn,
}

impl Fix {
    pub fn new(
        summary: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            summary: summary.into(),
            transform: Arc::new(transform),
        }
    }

    /// Short human description, e.g. "Add timeout-minutes to all jobs".
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Transform artifact content. Deterministic and side-effect free.
    pub fn apply(&self, content: &str) -> String {
        (self.transform)(content)
    }
}

impl std::fmt::Debug for Fix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fix").field("summary", &self.summary).finish()
    }
}

// Reports carry the fix as its suggestion text.
impl Serialize for Fix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.summary)
    }
}

/// What happened when a fix was applied to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    /// Content changed.
    Applied,
    /// Transformation was a no-op on the current content.
    Skipped,
    /// The fix could not be applied, with the reason.
    Failed(String),
}

/// Per-issue outcome of a fix application pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixOutcome {
    pub rule: String,
    pub file: String,
    pub status: FixStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_pure() {
        let fix = Fix::new("Uppercase", |content: &str| content.to_uppercase());
        assert_eq!(fix.apply("abc"), "ABC");
        assert_eq!(fix.apply("abc"), "ABC");
        assert_eq!(fix.summary(), "Uppercase");
    }

    #[test]
    fn test_serializes_as_summary_string() {
        let fix = Fix::new("Add timeout", |c: &str| c.to_string());
        assert_eq!(serde_json::to_value(&fix).unwrap(), "Add timeout");
    }
}
