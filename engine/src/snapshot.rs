//! Point-in-time copies of a [`MemoryDatastore`].
//!
//! A snapshot is what the server writes to disk before each commit and reads
//! back at startup. Maps are ordered, so equal stores produce equal bytes.
//!
//! [`MemoryDatastore`]: crate::MemoryDatastore

use crate::{error::Result, Error, Kind, PropertyList, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest snapshot layout this build can read.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Records of one kind, keyed by id.
pub type KindRecords = BTreeMap<RecordId, PropertyList>;

/// Every stored property bag, grouped by kind then id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatastoreSnapshot {
    pub format_version: u32,
    pub kinds: BTreeMap<Kind, KindRecords>,
}

impl Default for DatastoreSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(err: serde_json::Error) -> Error {
    Error::InvalidSnapshot(err.to_string())
}

impl DatastoreSnapshot {
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            kinds: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the record `kind`/`id`.
    pub fn add_record(
        &mut self,
        kind: impl Into<Kind>,
        id: impl Into<RecordId>,
        properties: PropertyList,
    ) {
        let records = self.kinds.entry(kind.into()).or_default();
        records.insert(id.into(), properties);
    }

    pub fn get_record(&self, kind: &str, id: &str) -> Option<&PropertyList> {
        self.kinds.get(kind).and_then(|records| records.get(id))
    }

    /// Total number of records over all kinds.
    pub fn record_count(&self) -> usize {
        self.kinds.values().map(BTreeMap::len).sum()
    }

    /// Reject layouts from a newer build and blank kinds or ids.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "format version {} is newer than {}",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        for (kind, records) in &self.kinds {
            if kind.is_empty() {
                return Err(Error::InvalidSnapshot("empty kind".to_string()));
            }
            if records.contains_key("") {
                return Err(Error::InvalidSnapshot(format!("empty record id in {kind}")));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(invalid)
    }

    /// Indented form, used for files meant to be read by people.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(invalid)
    }

    /// Parse and [`validate`](Self::validate) a snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Self = serde_json::from_str(json).map_err(invalid)?;
        parsed.validate().map(|()| parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Property;

    fn two_kinds() -> DatastoreSnapshot {
        let mut snapshot = DatastoreSnapshot::default();
        snapshot.add_record(
            "users",
            "u-1",
            vec![
                Property::single("name", "Alice"),
                Property::multiple("tags", "a"),
                Property::multiple("tags", "b"),
            ],
        );
        snapshot.add_record("posts", "p-1", vec![Property::single("title", "Hi")]);
        snapshot
    }

    #[test]
    fn default_has_current_version_and_no_records() {
        let snapshot = DatastoreSnapshot::default();
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert!(snapshot.kinds.is_empty());
        assert_eq!(snapshot.record_count(), 0);
    }

    #[test]
    fn records_are_found_by_kind_and_id() {
        let snapshot = two_kinds();
        assert_eq!(snapshot.record_count(), 2);
        assert_eq!(snapshot.get_record("users", "u-1").map(Vec::len), Some(3));
        assert_eq!(snapshot.get_record("users", "p-1"), None);
        assert_eq!(snapshot.get_record("comments", "u-1"), None);
    }

    #[test]
    fn adding_an_existing_id_overwrites() {
        let mut snapshot = two_kinds();
        snapshot.add_record("posts", "p-1", vec![]);
        assert_eq!(snapshot.record_count(), 2);
        assert_eq!(snapshot.get_record("posts", "p-1"), Some(&vec![]));
    }

    #[test]
    fn parses_what_it_writes() {
        let snapshot = two_kinds();
        let compact = snapshot.to_json().unwrap();
        assert!(compact.starts_with(r#"{"formatVersion":1,"kinds":{"posts""#));
        assert_eq!(DatastoreSnapshot::from_json(&compact).unwrap(), snapshot);

        let pretty = snapshot.to_json_pretty().unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(DatastoreSnapshot::from_json(&pretty).unwrap(), snapshot);
    }

    #[test]
    fn newer_layout_is_refused() {
        let mut snapshot = two_kinds();
        snapshot.format_version += 1;
        let text = snapshot.to_json().unwrap();

        match DatastoreSnapshot::from_json(&text) {
            Err(Error::InvalidSnapshot(message)) => assert!(message.contains("newer")),
            other => panic!("expected an invalid snapshot, got {other:?}"),
        }
    }

    #[test]
    fn blank_ids_and_kinds_are_refused() {
        let mut snapshot = two_kinds();
        snapshot.add_record("users", "", vec![]);
        assert!(snapshot.validate().is_err());

        let mut snapshot = DatastoreSnapshot::new();
        snapshot.add_record("", "x", vec![]);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn unparsable_text_is_refused() {
        for text in ["not json", "{}", r#"{"formatVersion":1}"#] {
            assert!(
                matches!(DatastoreSnapshot::from_json(text), Err(Error::InvalidSnapshot(_))),
                "{text}"
            );
        }
    }
}
