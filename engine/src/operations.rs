//! Record operations: create, get, update, delete and list.
//!
//! Each operation runs in exactly one store transaction. Bodies are
//! validated and flattened before the transaction begins, so a rejected
//! document never touches the store.

use crate::{
    codec::{flatten, unflatten},
    error::Result,
    query::run_query,
    record::strip_keys,
    store::{run_transaction, Datastore, TransactionMode},
    Document, Error, ListRequest, Page, Record, TimeSource, Value, CREATED_KEY, ID_KEY,
    RESERVED_KEYS, UPDATED_KEY,
};

/// Record operations over one datastore.
pub struct Records<S> {
    store: S,
    clock: Box<dyn TimeSource>,
}

impl<S: Datastore> Records<S> {
    pub fn new(store: S, clock: impl TimeSource + 'static) -> Self {
        Self {
            store,
            clock: Box::new(clock),
        }
    }

    /// The underlying datastore.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store `body` as a new record of `kind`.
    ///
    /// Client-supplied reserved keys are discarded; the returned document
    /// carries the assigned `_id` and `_created`.
    pub fn create(&self, kind: &str, mut body: Document) -> Result<Document> {
        if kind.is_empty() {
            return Err(Error::EmptyKind);
        }
        strip_keys(&mut body, &RESERVED_KEYS);
        body.insert(CREATED_KEY.to_string(), Value::from(self.clock.now()));
        let properties = flatten(&body)?;

        let id = run_transaction(&self.store, TransactionMode::ReadWrite, |txn| {
            txn.put(kind, None, properties.clone())
        })?;
        Ok(unflatten(&properties, &id))
    }

    /// Fetch one record.
    pub fn get(&self, kind: &str, id: &str) -> Result<Document> {
        self.record(kind, id).map(|record| record.body)
    }

    /// Fetch one record together with its address.
    pub fn record(&self, kind: &str, id: &str) -> Result<Record> {
        let properties = run_transaction(&self.store, TransactionMode::ReadOnly, |txn| {
            txn.get(kind, id)
        })?
        .ok_or_else(|| Error::not_found(kind, id))?;
        Ok(Record::from_properties(kind, id, &properties))
    }

    /// Replace the body of an existing record.
    ///
    /// The new body wholly replaces the old one, so a previous `_created`
    /// does not survive.
    pub fn update(&self, kind: &str, id: &str, mut body: Document) -> Result<Document> {
        strip_keys(&mut body, &[ID_KEY, CREATED_KEY]);
        body.insert(UPDATED_KEY.to_string(), Value::from(self.clock.now()));
        let properties = flatten(&body)?;

        run_transaction(&self.store, TransactionMode::ReadWrite, |txn| {
            if txn.get(kind, id)?.is_none() {
                return Err(Error::not_found(kind, id));
            }
            txn.put(kind, Some(id), properties.clone())
        })?;
        Ok(unflatten(&properties, id))
    }

    /// Remove one record.
    pub fn delete(&self, kind: &str, id: &str) -> Result<()> {
        run_transaction(&self.store, TransactionMode::ReadWrite, |txn| {
            txn.delete(kind, id)
        })
    }

    /// Fetch one page of records of `kind`.
    pub fn list(&self, kind: &str, request: &ListRequest) -> Result<Page> {
        run_transaction(&self.store, TransactionMode::ReadOnly, |txn| {
            run_query(txn, kind, request)
        })
    }
}
