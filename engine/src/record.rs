//! Record types and the reserved, server-managed body keys.

use crate::{codec, Document, Kind, Property, RecordId};
use serde::{Deserialize, Serialize};

/// Key holding the record identifier in a decoded body.
pub const ID_KEY: &str = "_id";
/// Key holding the creation time (seconds since epoch).
pub const CREATED_KEY: &str = "_created";
/// Key holding the last replacement time (seconds since epoch).
pub const UPDATED_KEY: &str = "_updated";

/// Keys a client can never set.
pub const RESERVED_KEYS: [&str; 3] = [ID_KEY, CREATED_KEY, UPDATED_KEY];

/// A stored document together with its address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Store-assigned identifier
    pub id: RecordId,
    /// Kind the record lives in
    pub kind: Kind,
    /// Decoded body, including the reserved keys
    pub body: Document,
}

impl Record {
    /// Decode a record from its stored properties.
    pub fn from_properties(
        kind: impl Into<Kind>,
        id: impl Into<RecordId>,
        properties: &[Property],
    ) -> Self {
        let id = id.into();
        let body = codec::unflatten(properties, &id);
        Self {
            id,
            kind: kind.into(),
            body,
        }
    }

    /// Timestamp stored under `_created`, if any.
    pub fn created_at(&self) -> Option<i64> {
        timestamp(&self.body, CREATED_KEY)
    }

    /// Timestamp stored under `_updated`, if any.
    pub fn updated_at(&self) -> Option<i64> {
        timestamp(&self.body, UPDATED_KEY)
    }
}

fn timestamp(body: &Document, key: &str) -> Option<i64> {
    match body.get(key)? {
        crate::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Remove the given reserved keys from a client-supplied body.
pub(crate) fn strip_keys(body: &mut Document, keys: &[&str]) {
    for key in keys {
        body.remove(*key);
    }
}
