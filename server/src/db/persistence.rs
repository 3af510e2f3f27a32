//! Snapshot file persistence.
//!
//! The whole store is written as one JSON snapshot. Writes go to a sibling
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous snapshot intact.
//!
//! As a [`CommitHook`] the file is rewritten before each store commit, so a
//! change that cannot be saved is rolled back instead of becoming visible.

use parking_lot::Mutex;
use simplyput_engine::{CommitHook, DatastoreSnapshot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("snapshot io: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Snapshot(#[from] simplyput_engine::Error),
}

/// A snapshot file on disk.
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `None` if the file does not exist yet.
    pub fn load(&self) -> Result<Option<DatastoreSnapshot>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(DatastoreSnapshot::from_json(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file with `snapshot`. Writers are serialized.
    pub fn save(&self, snapshot: &DatastoreSnapshot) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock();
        let json = snapshot.to_json_pretty()?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl CommitHook for SnapshotFile {
    fn before_commit(&self, snapshot: &DatastoreSnapshot) -> simplyput_engine::Result<()> {
        self.save(snapshot).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Snapshot write failed");
            simplyput_engine::Error::Store(format!("snapshot not saved: {e}"))
        })
    }
}
