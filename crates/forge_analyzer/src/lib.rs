//! # forge_analyzer
//!
//! Rule-based CI/CD configuration analysis and mechanical fixes for
//! BuildForge.
//!
//! The analyzer never touches the filesystem: it consumes a [`Snapshot`]
//! (a name-to-content map of workflow definitions, the dependency manifest,
//! and source artifacts), evaluates an ordered set of [`IssueRule`]s, and
//! produces a [`Report`]. Issues may carry a [`Fix`], a pure and idempotent
//! content transformation, which [`AnalyzerPipeline::apply_fixes`] applies
//! one artifact at a time, yielding a new snapshot for re-analysis.
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_analyzer::{AnalyzerPipeline, Snapshot};
//!
//! let snapshot = Snapshot::new()
//!     .with_file(".github/workflows/ci.yml", workflow_text)
//!     .with_file("pubspec.yaml", manifest_text);
//!
//! let pipeline = AnalyzerPipeline::with_default_rules();
//! let report = pipeline.analyze(&snapshot);
//! let (fixed, outcomes) = pipeline.apply_fixes(&snapshot, &report, None);
//! let confirmation = pipeline.analyze(&fixed);
//! ```

pub mod error;
pub mod fix;
pub mod issue;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod snapshot;

// Re-export main types for convenience
pub use error::{AnalyzerError, AnalyzerResult};
pub use fix::{Fix, FixFn, FixOutcome, FixStatus};
pub use issue::{Issue, IssueSeverity};
pub use pipeline::AnalyzerPipeline;
pub use report::{Report, ReportStatus};
pub use rules::{default_rules, IssueRule};
pub use snapshot::Snapshot;
