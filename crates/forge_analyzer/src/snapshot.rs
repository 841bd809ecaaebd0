//! In-memory project snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name→content view of the project artifacts under analysis, decoupled from
/// the filesystem. Reading files from disk and writing fixed content back is
/// the caller's job; rules and the pipeline only ever see this map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    files: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }

    /// Builder-style insert.
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All artifacts, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// CI workflow definitions (`.github/workflows/*.yml|yaml`).
    pub fn workflow_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(name, _)| {
            name.contains(".github/workflows/")
                && (name.ends_with(".yml") || name.ends_with(".yaml"))
        })
    }

    /// Artifacts with the given extension (without the dot).
    pub fn files_with_extension<'a>(
        &'a self,
        ext: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.iter()
            .filter(move |(name, _)| name.rsplit('.').next() == Some(ext))
    }

    /// Names whose content differs from (or is absent in) `other`.
    pub fn changed_since(&self, other: &Snapshot) -> Vec<String> {
        self.files
            .iter()
            .filter(|(name, content)| other.get(name) != Some(content.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl FromIterator<(String, String)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
