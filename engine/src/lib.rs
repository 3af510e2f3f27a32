//! # SimplyPut Engine
//!
//! The core of a generic REST document store whose backing store is a flat,
//! schema-less property bag.
//!
//! Clients hand the store arbitrary JSON objects. The backing store only
//! understands flat records made of named, possibly repeated, scalar
//! properties. This crate maps between the two worlds and drives paged
//! queries over the flat representation.
//!
//! ## Design Principles
//!
//! - **No network IO**: the engine knows nothing about HTTP or credentials
//! - **Closed value model**: every JSON shape is one [`Value`] variant
//! - **Transactional**: every record operation runs in exactly one store
//!   transaction that commits or rolls back on every exit path
//! - **Injected time**: timestamps come from a [`TimeSource`]
//!
//! ## Core Concepts
//!
//! ### Codec
//!
//! [`flatten`] turns a nested [`Document`] into a [`PropertyList`]. Nested
//! keys become dotted paths (`a.b.c`) and list elements become repeated
//! properties flagged `multiple`. [`unflatten`] rebuilds the document,
//! forming a list whenever a path occurs more than once.
//!
//! A list of exactly one element comes back as a bare scalar. This
//! scalar-collapse is part of the contract.
//!
//! ### Store
//!
//! The [`Datastore`] trait is the storage adapter. [`MemoryDatastore`] is the
//! bundled implementation; [`DatastoreSnapshot`] persists it, and a
//! [`CommitHook`] can make each commit durable before it becomes visible.
//!
//! ### Queries
//!
//! A [`ListRequest`] carries equality filters, an optional sort and opaque
//! start/end cursors. [`run_query`] streams matching records, decodes them
//! and returns a [`Page`] with the token that resumes after its last item.
//!
//! ## Quick Start
//!
//! ```rust
//! use simplyput_engine::{FixedTimeSource, MemoryDatastore, Records, ListRequest, Value};
//! use serde_json::json;
//!
//! let records = Records::new(MemoryDatastore::new(), FixedTimeSource::new(1_700_000_000));
//!
//! let body = serde_json::from_value(json!({"title": "hello", "tags": ["a", "b"]})).unwrap();
//! let created = records.create("notes", body).unwrap();
//! assert_eq!(created["_created"], Value::from(1_700_000_000i64));
//!
//! let page = records.list("notes", &ListRequest::default()).unwrap();
//! assert_eq!(page.items.len(), 1);
//! ```

pub mod clock;
pub mod codec;
pub mod cursor;
pub mod error;
pub mod memory;
pub mod operations;
pub mod property;
pub mod query;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod value;

// Re-export main types at crate root
pub use clock::{FixedTimeSource, TimeSource};
pub use codec::{flatten, unflatten};
pub use cursor::Cursor;
pub use error::{Error, ErrorKind, Result};
pub use memory::{CommitHook, MemoryDatastore};
pub use operations::Records;
pub use property::{Property, PropertyList};
pub use query::{
    run_query, Filter, ListRequest, Page, SortDirection, SortOrder, StoreQuery, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use record::{Record, CREATED_KEY, ID_KEY, RESERVED_KEYS, UPDATED_KEY};
pub use snapshot::{DatastoreSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{run_transaction, Datastore, RecordStream, Transaction, TransactionMode};
pub use value::{Document, Scalar, Value};

/// Type aliases for clarity
pub type RecordId = String;
pub type Kind = String;
pub type Timestamp = i64;
