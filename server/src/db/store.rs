//! Record store construction.

use simplyput_engine::{MemoryDatastore, Records};
use std::sync::Arc;

use super::{PersistenceError, SnapshotFile};
use crate::clock::SystemClock;

/// Shared handle to the record operations.
pub type Store = Arc<Records<MemoryDatastore>>;

/// Create the record store.
///
/// With a snapshot file the store starts from its contents and writes every
/// commit back to it.
pub fn create_store(snapshots: Option<Arc<SnapshotFile>>) -> Result<Store, PersistenceError> {
    let loaded = match &snapshots {
        Some(file) => file.load()?,
        None => None,
    };

    let datastore = match loaded {
        Some(snapshot) => {
            tracing::info!(records = snapshot.record_count(), "Restored store from snapshot");
            MemoryDatastore::from_snapshot(snapshot)?
        }
        None => MemoryDatastore::new(),
    };
    let datastore = match snapshots {
        Some(file) => datastore.with_commit_hook(file),
        None => datastore,
    };

    Ok(Arc::new(Records::new(datastore, SystemClock)))
}
