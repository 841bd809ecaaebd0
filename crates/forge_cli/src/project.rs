//! Filesystem snapshot loading and write-back.
//!
//! This is the analyzer's filesystem boundary: which files constitute "the
//! project" is decided here, and the pipeline itself only ever sees the
//! in-memory snapshot.

use std::path::Path;

use anyhow::Context;
use tracing::debug;
use walkdir::WalkDir;

use forge_analyzer::Snapshot;

const SKIP_DIRS: [&str; 6] = [".git", ".dart_tool", "build", ".forge", ".idea", "node_modules"];

/// Collect the artifacts the analyzer cares about: workflow definitions,
/// the dependency manifest, and Dart sources.
pub fn load_snapshot(root: &Path) -> anyhow::Result<Snapshot> {
    let mut snapshot = Snapshot::new();

    for pattern in ["*.yml", "*.yaml"] {
        let glob_pattern = root.join(".github/workflows").join(pattern);
        for path in glob::glob(&glob_pattern.to_string_lossy())
            .context("invalid workflow glob")?
            .flatten()
        {
            insert_file(&mut snapshot, root, &path)?;
        }
    }

    let manifest = root.join("pubspec.yaml");
    if manifest.is_file() {
        insert_file(&mut snapshot, root, &manifest)?;
    }

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext == "dart")
                .unwrap_or(false)
        })
    {
        insert_file(&mut snapshot, root, entry.path())?;
    }

    debug!("Snapshot holds {} artifacts", snapshot.len());
    Ok(snapshot)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIP_DIRS.contains(&name))
            .unwrap_or(false)
}

fn insert_file(snapshot: &mut Snapshot, root: &Path, path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    snapshot.insert(name, content);
    Ok(())
}

/// Write artifacts whose content changed back to disk. Returns the names of
/// the rewritten artifacts.
pub fn write_changes(
    root: &Path,
    before: &Snapshot,
    after: &Snapshot,
) -> anyhow::Result<Vec<String>> {
    let changed = after.changed_since(before);
    for name in &changed {
        if let Some(content) = after.get(name) {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("writing {}", path.display()))?;
            debug!("Rewrote {}", path.display());
        }
    }
    Ok(changed)
}
