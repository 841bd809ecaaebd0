//! Rules over the dependency manifest (`pubspec.yaml`).

use crate::error::AnalyzerResult;
use crate::fix::Fix;
use crate::issue::{Issue, IssueSeverity};
use crate::rules::{rejoin, IssueRule};
use crate::snapshot::Snapshot;

pub(crate) const MANIFEST: &str = "pubspec.yaml";

/// Known heavyweight packages worth a startup-cost review.
const HEAVY_PACKAGES: [&str; 4] = [
    "firebase_core",
    "google_maps_flutter",
    "camera",
    "video_player",
];

/// Append `entries` (pre-indented) under a top-level `section`, creating the
/// section at the end of the manifest when absent.
fn add_under_section(content: &str, section: &str, entries: &[&str]) -> String {
    if content.lines().any(|line| line.trim_end() == section) {
        let mut lines = Vec::new();
        for line in content.lines() {
            lines.push(line.to_string());
            if line.trim_end() == section {
                lines.extend(entries.iter().map(|e| e.to_string()));
            }
        }
        return rejoin(content, lines);
    }

    let mut out = content.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(section);
    out.push('\n');
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}

/// Flags manifests without an SDK version constraint.
pub struct SdkConstraintRule;

fn add_sdk_constraint(content: &str) -> String {
    if content.contains("sdk:") {
        return content.to_string();
    }
    add_under_section(content, "environment:", &["  sdk: '>=3.0.0 <4.0.0'"])
}

impl IssueRule for SdkConstraintRule {
    fn name(&self) -> &'static str {
        "sdk_constraint_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let Some(content) = snapshot.get(MANIFEST) else {
            return Ok(Vec::new());
        };
        if content.contains("sdk:") {
            return Ok(Vec::new());
        }
        Ok(vec![Issue::new(
            self.name(),
            IssueSeverity::Error,
            "No SDK version constraint",
            MANIFEST,
        )
        .with_fix(Fix::new(
            "Add an sdk constraint under environment",
            add_sdk_constraint,
        ))])
    }
}

/// Flags manifests without lint rules configured.
pub struct LintsRule;

fn add_lints(content: &str) -> String {
    if content.contains("flutter_lints") {
        return content.to_string();
    }
    add_under_section(content, "dev_dependencies:", &["  flutter_lints: ^4.0.0"])
}

impl IssueRule for LintsRule {
    fn name(&self) -> &'static str {
        "linting_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let Some(content) = snapshot.get(MANIFEST) else {
            return Ok(Vec::new());
        };
        if content.contains("flutter_lints") {
            return Ok(Vec::new());
        }
        Ok(vec![Issue::new(
            self.name(),
            IssueSeverity::Info,
            "No linting rules configured",
            MANIFEST,
        )
        .with_fix(Fix::new("Add flutter_lints to dev_dependencies", add_lints))])
    }
}

/// Flags manifests without the test framework dependency.
pub struct TestDependencyRule;

fn add_test_dependency(content: &str) -> String {
    if content.contains("flutter_test") {
        return content.to_string();
    }
    add_under_section(
        content,
        "dev_dependencies:",
        &["  flutter_test:", "    sdk: flutter"],
    )
}

impl IssueRule for TestDependencyRule {
    fn name(&self) -> &'static str {
        "test_dependencies_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let Some(content) = snapshot.get(MANIFEST) else {
            return Ok(Vec::new());
        };
        if content.contains("flutter_test") {
            return Ok(Vec::new());
        }
        Ok(vec![Issue::new(
            self.name(),
            IssueSeverity::Warning,
            "No test dependencies configured",
            MANIFEST,
        )
        .with_fix(Fix::new(
            "Add flutter_test to dev_dependencies",
            add_test_dependency,
        ))])
    }
}

/// Flags `json_serializable` without its required code generator.
pub struct BuildRunnerRule;

fn add_build_runner(content: &str) -> String {
    if content.contains("build_runner") {
        return content.to_string();
    }
    add_under_section(content, "dev_dependencies:", &["  build_runner: ^2.4.9"])
}

impl IssueRule for BuildRunnerRule {
    fn name(&self) -> &'static str {
        "build_runner_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let Some(content) = snapshot.get(MANIFEST) else {
            return Ok(Vec::new());
        };
        if !content.contains("json_serializable") || content.contains("build_runner") {
            return Ok(Vec::new());
        }
        Ok(vec![Issue::new(
            self.name(),
            IssueSeverity::Warning,
            "json_serializable requires build_runner",
            MANIFEST,
        )
        .with_fix(Fix::new(
            "Add build_runner to dev_dependencies",
            add_build_runner,
        ))])
    }
}

/// Flags HTTP usage without response caching.
pub struct ImageCachingRule;

fn add_image_caching(content: &str) -> String {
    if content.contains("cached_network_image") {
        return content.to_string();
    }
    add_under_section(content, "dependencies:", &["  cached_network_image: ^3.3.1"])
}

impl IssueRule for ImageCachingRule {
    fn name(&self) -> &'static str {
        "image_caching_missing"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let Some(content) = snapshot.get(MANIFEST) else {
            return Ok(Vec::new());
        };
        if !content.contains("http:") || content.contains("cached_network_image") {
            return Ok(Vec::new());
        }
        Ok(vec![Issue::new(
            self.name(),
            IssueSeverity::Warning,
            "HTTP requests without caching",
            MANIFEST,
        )
        .with_fix(Fix::new(
            "Add cached_network_image for HTTP image loads",
            add_image_caching,
        ))])
    }
}

/// Reports known heavyweight dependencies. Advisory only: there is no
/// mechanical remediation for a package the app may genuinely need.
pub struct HeavyDependencyRule;

impl IssueRule for HeavyDependencyRule {
    fn name(&self) -> &'static str {
        "heavy_dependency"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> AnalyzerResult<Vec<Issue>> {
        let Some(content) = snapshot.get(MANIFEST) else {
            return Ok(Vec::new());
        };
        Ok(HEAVY_PACKAGES
            .iter()
            .filter(|package| content.contains(**package))
            .map(|package| {
                Issue::new(
                    self.name(),
                    IssueSeverity::Info,
                    format!("Heavy dependency: {package}; consider deferred loading"),
                    MANIFEST,
                )
            })
            .collect())
    }
}
