//! Backup files: the exported snapshot written to disk and read back in.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::storage::SnapshotStorage;
use crate::store::Store;

/// File name used for exports.
pub const BACKUP_FILE_NAME: &str = "songs_backup.json";

/// Write the current snapshot to `target`. A directory target gets
/// `songs_backup.json` appended. Returns the path actually written.
pub fn export_to_path<S: SnapshotStorage>(store: &Store<S>, target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(BACKUP_FILE_NAME)
    } else {
        target.to_path_buf()
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create export directory")?;
        }
    }

    fs::write(&path, store.export_snapshot())
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("exported {} songs to {}", store.len(), path.display());
    Ok(path)
}

/// Read `path` in full and import it. The file is loaded completely before
/// the store is touched, so a read error never leaves a partial import.
pub fn import_from_path<S: SnapshotStorage>(store: &mut Store<S>, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    store
        .import_snapshot(&text)
        .with_context(|| format!("failed to import {}", path.display()))?;
    Ok(store.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::store;

    #[test]
    fn export_into_directory_uses_backup_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store();
        store.add_song("A", "x", "https://youtu.be/a").unwrap();

        let path = export_to_path(&store, dir.path()).unwrap();

        assert_eq!(path, dir.path().join(BACKUP_FILE_NAME));
        assert_eq!(fs::read_to_string(&path).unwrap(), store.export_snapshot());
    }

    #[test]
    fn export_to_explicit_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("mine.json");

        let path = export_to_path(&store(), &target).unwrap();

        assert_eq!(path, target);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn import_round_trips_an_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = store();
        source.add_song("A", "x", "https://youtu.be/a").unwrap();
        source.add_song("B", "y", "https://tabs.example/b").unwrap();
        let path = export_to_path(&source, dir.path()).unwrap();

        let mut target = store();
        let count = import_from_path(&mut target, &path).unwrap();

        assert_eq!(count, 2);
        assert_eq!(target.songs(), source.songs());
    }

    #[test]
    fn missing_file_is_an_error_and_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store();
        store.add_song("Keep", "x", "l").unwrap();

        assert!(import_from_path(&mut store, &dir.path().join("nope.json")).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn invalid_file_surfaces_import_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BACKUP_FILE_NAME);
        fs::write(&path, "{ not a list").unwrap();
        let mut store = store();

        let err = import_from_path(&mut store, &path).unwrap_err();
        assert!(err
            .chain()
            .any(|cause| cause.to_string().starts_with("not a valid song list")));
    }
}
