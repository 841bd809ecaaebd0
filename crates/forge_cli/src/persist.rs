//! Run-history persistence.
//!
//! The store itself is memory-only. The CLI keeps the retained entries as a
//! JSON list and rebuilds the store by re-appending on load, so persisted
//! metrics always equal a fold over what was saved and can never drift.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use forge_history::{HistoryEntry, HistoryStore};

/// Load the history file, or an empty store when it does not exist yet.
pub fn load(path: &Path, retention: usize) -> anyhow::Result<HistoryStore> {
    let mut store = HistoryStore::with_retention(retention);
    if !path.exists() {
        return Ok(store);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading history {}", path.display()))?;
    let entries: Vec<HistoryEntry> = serde_json::from_str(&content)
        .with_context(|| format!("invalid history {}", path.display()))?;

    debug!("Loaded {} history entries from {}", entries.len(), path.display());
    for entry in entries {
        store.append(entry.result, entry.target_label);
    }
    Ok(store)
}

/// Persist the retained entries, creating parent directories as needed.
pub fn save(path: &Path, store: &HistoryStore) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let entries: Vec<&HistoryEntry> = store.entries().collect();
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forge_runner::{CommandSpec, RunResult};

    fn result(succeeded: bool) -> RunResult {
        RunResult {
            spec: CommandSpec::new("flutter").arg("test"),
            exit_code: Some(if succeeded { 0 } else { 1 }),
            lines: Vec::new(),
            succeeded,
            started_at: Utc::now(),
            duration_ms: 1500,
            failure: None,
            failure_kind: None,
        }
    }

    #[test]
    fn test_round_trip_preserves_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".forge/history.json");

        let mut store = HistoryStore::with_retention(50);
        store.append(result(true), "web");
        store.append(result(false), "android");
        save(&path, &store).unwrap();

        let loaded = load(&path, 50).unwrap();
        assert_eq!(loaded.metrics(), store.metrics());
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("none.json"), 10).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.retention(), 10);
    }

    #[test]
    fn test_load_applies_current_retention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::with_retention(50);
        for _ in 0..10 {
            store.append(result(true), "host");
        }
        save(&path, &store).unwrap();

        // A tighter retention on load evicts the oldest persisted entries.
        let loaded = load(&path, 3).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.metrics(), loaded.recompute());
    }
}
