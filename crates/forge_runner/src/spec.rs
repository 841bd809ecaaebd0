//! Command specifications.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Build target a command is executed for.
///
/// Carried as data alongside the command so per-target metrics never have to
/// be inferred from the command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Android,
    Ios,
    Web,
    Windows,
    Macos,
    Linux,
    /// The machine the runner itself is on.
    Host,
}

impl TargetKind {
    /// Label used for per-target metrics buckets.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Web => "web",
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Linux => "linux",
            Self::Host => "host",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "web" => Ok(Self::Web),
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::Macos),
            "linux" => Ok(Self::Linux),
            "host" => Ok(Self::Host),
            other => Err(format!("unknown target '{other}'")),
        }
    }
}

/// Immutable description of one toolchain command invocation.
///
/// The executable path is expected to be already resolved; locating the
/// toolchain binary is a configuration concern outside the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Resolved executable path or name.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory for the child process.
    pub cwd: PathBuf,
    /// Environment overrides applied on top of the inherited environment.
    pub env: HashMap<String, String>,
    /// Wall-clock limit for the whole run.
    pub timeout_seconds: Option<u64>,
    /// Target platform this command builds or tests for.
    pub target: TargetKind,
    /// Kill the process on the first error-classified output line.
    pub fail_fast: bool,
    /// Capture stderr into the classified line stream. When false, stderr
    /// is left unread and only stdout is observed.
    pub capture_stderr: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: PathBuf::from("."),
            env: HashMap::new(),
            timeout_seconds: None,
            target: TargetKind::Host,
            fail_fast: false,
            capture_stderr: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for arg in args {
            self.args.push(arg.into());
        }
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = dir.into();
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    pub fn capture_stderr(mut self, enabled: bool) -> Self {
        self.capture_stderr = enabled;
        self
    }

    /// Render the command line for logs and failure summaries.
    pub fn display_command(&self) -> String {
        let mut cmd = self.program.clone();
        for arg in &self.args {
            if arg.contains(' ') || arg.contains('=') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = CommandSpec::new("flutter");

        assert_eq!(spec.program, "flutter");
        assert!(spec.args.is_empty());
        assert_eq!(spec.target, TargetKind::Host);
        assert!(!spec.fail_fast);
        assert!(spec.capture_stderr);
        assert!(spec.timeout_seconds.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let spec = CommandSpec::new("flutter")
            .args(["build", "apk"])
            .arg("--release")
            .cwd("/work/app")
            .env("PUB_CACHE", "/tmp/pub")
            .timeout_seconds(600)
            .target(TargetKind::Android)
            .fail_fast(true);

        assert_eq!(spec.args, vec!["build", "apk", "--release"]);
        assert_eq!(spec.cwd, PathBuf::from("/work/app"));
        assert_eq!(spec.env.get("PUB_CACHE").map(String::as_str), Some("/tmp/pub"));
        assert_eq!(spec.timeout_seconds, Some(600));
        assert_eq!(spec.target, TargetKind::Android);
        assert!(spec.fail_fast);
    }

    #[test]
    fn test_display_command_quotes_spaced_args() {
        let spec = CommandSpec::new("dart").arg("format").arg("lib dir");
        assert_eq!(spec.display_command(), "dart format 'lib dir'");
    }

    #[test]
    fn test_target_round_trip() {
        for target in [
            TargetKind::Android,
            TargetKind::Ios,
            TargetKind::Web,
            TargetKind::Windows,
            TargetKind::Macos,
            TargetKind::Linux,
            TargetKind::Host,
        ] {
            assert_eq!(target.label().parse::<TargetKind>().unwrap(), target);
        }
        assert!("gameboy".parse::<TargetKind>().is_err());
    }
}
