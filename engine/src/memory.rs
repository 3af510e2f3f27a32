//! In-memory datastore.
//!
//! All kinds live behind one `RwLock`. A read-only transaction holds the read
//! guard for its whole lifetime; a read-write transaction holds the write
//! guard and an undo log, so writers are serialized and readers never see a
//! partial write. Dropping a read-write transaction without committing it
//! replays the undo log.
//!
//! A [`CommitHook`] sees the pending contents of every read-write transaction
//! that changed something, while the write guard is still held. If the hook
//! fails the commit fails and the changes are undone.

use crate::{
    cursor::compare_positions,
    error::Result,
    snapshot::KindRecords,
    store::{Datastore, RecordStream, Transaction, TransactionMode},
    Cursor, DatastoreSnapshot, Error, Filter, Kind, PropertyList, RecordId, Scalar, SortOrder,
    StoreQuery,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Bound, Deref};
use std::sync::Arc;
use uuid::Uuid;

type State = BTreeMap<Kind, KindRecords>;

/// Runs before a read-write transaction with changes commits.
///
/// `snapshot` holds the contents as they will be once committed. Returning
/// an error rolls the transaction back and fails the commit with it.
pub trait CommitHook: Send + Sync {
    fn before_commit(&self, snapshot: &DatastoreSnapshot) -> Result<()>;
}

/// Thread-safe in-memory property-bag store.
#[derive(Default)]
pub struct MemoryDatastore {
    state: RwLock<State>,
    hook: Option<Arc<dyn CommitHook>>,
}

impl fmt::Debug for MemoryDatastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDatastore")
            .field("state", &self.state)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl MemoryDatastore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the contents of `snapshot`.
    pub fn from_snapshot(snapshot: DatastoreSnapshot) -> Result<Self> {
        snapshot.validate()?;
        Ok(Self {
            state: RwLock::new(snapshot.kinds),
            hook: None,
        })
    }

    /// Install `hook`, replacing any previous one.
    pub fn with_commit_hook(mut self, hook: Arc<dyn CommitHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Copy the current contents into a snapshot.
    pub fn export_snapshot(&self) -> DatastoreSnapshot {
        DatastoreSnapshot {
            kinds: self.state.read().clone(),
            ..DatastoreSnapshot::new()
        }
    }

    /// Replace the current contents with `snapshot`.
    pub fn import_snapshot(&self, snapshot: DatastoreSnapshot) -> Result<()> {
        snapshot.validate()?;
        *self.state.write() = snapshot.kinds;
        Ok(())
    }

    /// Number of records across all kinds.
    pub fn record_count(&self) -> usize {
        self.state.read().values().map(|records| records.len()).sum()
    }
}

impl Datastore for MemoryDatastore {
    fn begin(&self, mode: TransactionMode) -> Result<Box<dyn Transaction + '_>> {
        let guard = match mode {
            TransactionMode::ReadOnly => Guard::Read(self.state.read()),
            TransactionMode::ReadWrite => Guard::Write(self.state.write()),
        };
        Ok(Box::new(MemoryTransaction {
            guard,
            undo: Vec::new(),
            hook: self.hook.as_deref(),
        }))
    }
}

enum Guard<'a> {
    Read(RwLockReadGuard<'a, State>),
    Write(RwLockWriteGuard<'a, State>),
}

impl Deref for Guard<'_> {
    type Target = State;

    fn deref(&self) -> &State {
        match self {
            Guard::Read(guard) => &**guard,
            Guard::Write(guard) => &**guard,
        }
    }
}

/// Prior contents of one slot, restored on rollback.
struct Undo {
    kind: Kind,
    id: RecordId,
    previous: Option<PropertyList>,
}

/// A transaction over a [`MemoryDatastore`].
pub struct MemoryTransaction<'a> {
    guard: Guard<'a>,
    undo: Vec<Undo>,
    hook: Option<&'a dyn CommitHook>,
}

impl MemoryTransaction<'_> {
    fn undo_all(&mut self) {
        let Guard::Write(state) = &mut self.guard else {
            return;
        };
        for Undo { kind, id, previous } in self.undo.drain(..).rev() {
            let records = state.entry(kind.clone()).or_default();
            match previous {
                Some(properties) => {
                    records.insert(id, properties);
                }
                None => {
                    records.remove(&id);
                }
            }
            if records.is_empty() {
                state.remove(&kind);
            }
        }
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        self.undo_all();
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn get(&self, kind: &str, id: &str) -> Result<Option<PropertyList>> {
        Ok(self
            .guard
            .get(kind)
            .and_then(|records| records.get(id))
            .cloned())
    }

    fn put(
        &mut self,
        kind: &str,
        id: Option<&str>,
        properties: PropertyList,
    ) -> Result<RecordId> {
        let Guard::Write(state) = &mut self.guard else {
            return Err(Error::ReadOnlyTransaction);
        };
        let records = state.entry(kind.to_string()).or_default();

        let id = match id {
            Some(id) => id.to_string(),
            None => loop {
                let candidate = Uuid::new_v4().simple().to_string();
                if !records.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let previous = records.insert(id.clone(), properties);
        self.undo.push(Undo {
            kind: kind.to_string(),
            id: id.clone(),
            previous,
        });
        Ok(id)
    }

    fn delete(&mut self, kind: &str, id: &str) -> Result<()> {
        let Guard::Write(state) = &mut self.guard else {
            return Err(Error::ReadOnlyTransaction);
        };
        let records = state
            .get_mut(kind)
            .ok_or_else(|| Error::not_found(kind, id))?;
        let previous = records
            .remove(id)
            .ok_or_else(|| Error::not_found(kind, id))?;
        if records.is_empty() {
            state.remove(kind);
        }

        self.undo.push(Undo {
            kind: kind.to_string(),
            id: id.to_string(),
            previous: Some(previous),
        });
        Ok(())
    }

    fn iterate(&self, query: &StoreQuery) -> Result<Box<dyn RecordStream + '_>> {
        let entries: Box<dyn Iterator<Item = Entry<'_>> + '_> = match self.guard.get(&query.kind) {
            None => Box::new(std::iter::empty()),
            Some(records) => match &query.sort {
                Some(sort) => Box::new(sorted_entries(records, query, sort).into_iter()),
                None => unsorted_entries(records, query),
            },
        };

        Ok(Box::new(MemoryStream {
            entries,
            sort: query.sort.clone(),
            start: query.start.clone(),
            end: query.end.clone(),
            remaining: query.limit,
            last: None,
        }))
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        if let (Some(hook), Guard::Write(state)) = (self.hook, &self.guard) {
            if !self.undo.is_empty() {
                let pending = DatastoreSnapshot {
                    kinds: (**state).clone(),
                    ..DatastoreSnapshot::new()
                };
                // on error, dropping `self` replays the undo log
                hook.before_commit(&pending)?;
            }
        }
        self.undo.clear();
        Ok(())
    }

    fn rollback(mut self: Box<Self>) {
        self.undo_all();
    }
}

/// A candidate record and the value it sorts by.
struct Entry<'a> {
    id: &'a RecordId,
    properties: &'a PropertyList,
    value: Option<Scalar>,
}

/// Matching records in id order, produced lazily from the start position.
fn unsorted_entries<'a>(
    records: &'a KindRecords,
    query: &StoreQuery,
) -> Box<dyn Iterator<Item = Entry<'a>> + 'a> {
    let lower = match &query.start {
        Some(cursor) => Bound::Excluded(cursor.id.as_str()),
        None => Bound::Unbounded,
    };
    let filters = query.filters.clone();
    Box::new(
        records
            .range::<str, _>((lower, Bound::Unbounded))
            .filter(move |(_, properties)| matches_all(&filters, properties))
            .map(|(id, properties)| Entry {
                id,
                properties,
                value: None,
            }),
    )
}

/// The first `query.limit` matching records past the start cursor that
/// carry the sort property, in sort order.
///
/// Only the page itself is fully sorted; the rest of the kind is scanned
/// once and partitioned.
fn sorted_entries<'a>(
    records: &'a KindRecords,
    query: &StoreQuery,
    sort: &SortOrder,
) -> Vec<Entry<'a>> {
    let mut entries: Vec<Entry<'a>> = records
        .iter()
        .filter(|(_, properties)| matches_all(&query.filters, properties))
        .filter_map(|(id, properties)| {
            let value = sort.sort_value(properties)?;
            Some(Entry {
                id,
                properties,
                value: Some(value),
            })
        })
        .filter(|entry| match &query.start {
            Some(start) => start.compare(entry.value.as_ref(), entry.id) == Ordering::Greater,
            None => true,
        })
        .collect();

    let direction = Some(sort.direction);
    let order = |a: &Entry<'a>, b: &Entry<'a>| {
        compare_positions(
            direction,
            (a.value.as_ref(), a.id),
            (b.value.as_ref(), b.id),
        )
    };
    if entries.len() > query.limit {
        entries.select_nth_unstable_by(query.limit, order);
        entries.truncate(query.limit);
    }
    entries.sort_unstable_by(order);
    entries
}

fn matches_all(filters: &[Filter], properties: &PropertyList) -> bool {
    filters.iter().all(|f| f.matches(properties))
}

struct MemoryStream<'a> {
    entries: Box<dyn Iterator<Item = Entry<'a>> + 'a>,
    sort: Option<SortOrder>,
    start: Option<Cursor>,
    end: Option<Cursor>,
    remaining: usize,
    last: Option<Cursor>,
}

impl Iterator for MemoryStream<'_> {
    type Item = Result<(RecordId, PropertyList)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let entry = self.entries.next()?;
            let value = entry.value.as_ref();

            if let Some(start) = &self.start {
                if start.compare(value, entry.id) != Ordering::Greater {
                    continue;
                }
            }
            if let Some(end) = &self.end {
                if end.compare(value, entry.id) == Ordering::Greater {
                    self.remaining = 0;
                    return None;
                }
            }

            self.remaining -= 1;
            self.last = Some(Cursor::after(
                self.sort.clone(),
                entry.value.clone(),
                entry.id.clone(),
            ));
            return Some(Ok((entry.id.clone(), entry.properties.clone())));
        }
        None
    }
}

impl RecordStream for MemoryStream<'_> {
    fn cursor(&self) -> Option<Cursor> {
        self.last.clone()
    }
}
