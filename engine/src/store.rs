//! Storage adapter traits.
//!
//! A [`Datastore`] hands out [`Transaction`]s. Every record operation runs
//! inside exactly one of them through [`run_transaction`], which commits on
//! success and rolls back on any error. Implementations must also roll back
//! a transaction that is dropped without being committed, so that a panic
//! or an early return never leaves partial writes behind.

use crate::{error::Result, Cursor, PropertyList, RecordId, StoreQuery};

/// Access mode of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    ReadOnly,
    ReadWrite,
}

/// Records produced by a query, in result order.
///
/// The stream is lazy and finite. After each yielded record, [`cursor`]
/// returns the position just past it.
///
/// [`cursor`]: RecordStream::cursor
pub trait RecordStream: Iterator<Item = Result<(RecordId, PropertyList)>> {
    /// Position just past the most recently yielded record.
    fn cursor(&self) -> Option<Cursor>;
}

/// One unit of work against the store.
pub trait Transaction {
    /// Fetch the property bag of a record.
    fn get(&self, kind: &str, id: &str) -> Result<Option<PropertyList>>;

    /// Store a property bag, assigning a fresh id when `id` is `None`.
    fn put(&mut self, kind: &str, id: Option<&str>, properties: PropertyList)
        -> Result<RecordId>;

    /// Remove a record; fails with `RecordNotFound` if it does not exist.
    fn delete(&mut self, kind: &str, id: &str) -> Result<()>;

    /// Stream the records matching `query`.
    fn iterate(&self, query: &StoreQuery) -> Result<Box<dyn RecordStream + '_>>;

    /// Make every write of this transaction visible.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every write of this transaction.
    fn rollback(self: Box<Self>);
}

/// A transactional property-bag store, safe to share between threads.
pub trait Datastore: Send + Sync {
    fn begin(&self, mode: TransactionMode) -> Result<Box<dyn Transaction + '_>>;
}

/// Run `f` inside one transaction.
///
/// Commits when `f` succeeds and rolls back when it fails.
pub fn run_transaction<'s, T, F>(store: &'s dyn Datastore, mode: TransactionMode, f: F) -> Result<T>
where
    F: FnOnce(&mut (dyn Transaction + 's)) -> Result<T>,
{
    let mut txn = store.begin(mode)?;
    match f(txn.as_mut()) {
        Ok(value) => {
            txn.commit()?;
            Ok(value)
        }
        Err(e) => {
            txn.rollback();
            Err(e)
        }
    }
}
