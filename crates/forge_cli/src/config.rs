//! CLI configuration (`forge.yaml`).
//!
//! The toolchain executable and the task→argument table are injected here;
//! the core never guesses which binary to run or what its flags mean. The
//! `--target` flag is a metrics label carried alongside the command, not an
//! argument generator: task argument vectors are taken verbatim.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::debug;

use forge_history::DEFAULT_RETENTION;
use forge_runner::{ClassifierConfig, CommandSpec, PatternRule, TargetKind};

pub const CONFIG_FILE: &str = "forge.yaml";

/// One named task: the argument vector passed to the toolchain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub args: Vec<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl TaskConfig {
    fn new(args: &[&str]) -> Self {
        Self {
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout_seconds: None,
        }
    }
}

/// Project configuration for the `forge` CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Resolved toolchain executable.
    pub toolchain: String,
    /// Task name → argument vector.
    pub tasks: BTreeMap<String, TaskConfig>,
    /// Extra classifier rules, checked ahead of the defaults.
    pub classifier_rules: Vec<PatternRule>,
    /// Retained history size.
    pub retention: usize,
    /// Kill runs on the first error-classified line.
    pub fail_fast: bool,
    /// History file, relative to the project root.
    pub history_path: PathBuf,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        let tasks = BTreeMap::from([
            ("build".to_string(), TaskConfig::new(&["build"])),
            ("test".to_string(), TaskConfig::new(&["test"])),
            ("analyze".to_string(), TaskConfig::new(&["analyze"])),
            ("clean".to_string(), TaskConfig::new(&["clean"])),
            ("doctor".to_string(), TaskConfig::new(&["doctor"])),
            ("pub-get".to_string(), TaskConfig::new(&["pub", "get"])),
            ("pub-upgrade".to_string(), TaskConfig::new(&["pub", "upgrade"])),
            ("format".to_string(), TaskConfig::new(&["format", "."])),
        ]);
        Self {
            toolchain: "flutter".to_string(),
            tasks,
            classifier_rules: Vec::new(),
            retention: DEFAULT_RETENTION,
            fail_fast: false,
            history_path: PathBuf::from(".forge/history.json"),
        }
    }
}

impl ForgeConfig {
    /// Load from an explicit path (which must exist), from `forge.yaml`
    /// under the project root when present, or fall back to defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => {
                let candidate = root.join(CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let config: Self = serde_yaml::from_str(&content)
                    .with_context(|| format!("invalid config {}", path.display()))?;
                debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Classifier configuration with this project's extensions.
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig::default().with_rules(self.classifier_rules.clone())
    }

    /// Build the command spec for a named task.
    pub fn command_spec(
        &self,
        task: &str,
        root: &Path,
        target: TargetKind,
    ) -> anyhow::Result<CommandSpec> {
        let Some(task_config) = self.tasks.get(task) else {
            let available: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
            bail!("unknown task '{}' (available: {})", task, available.join(", "));
        };

        let mut spec = CommandSpec::new(&self.toolchain)
            .args(task_config.args.iter().cloned())
            .cwd(root)
            .target(target)
            .fail_fast(self.fail_fast);
        if let Some(seconds) = task_config.timeout_seconds {
            spec = spec.timeout_seconds(seconds);
        }
        Ok(spec)
    }
}
