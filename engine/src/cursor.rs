//! Opaque cursors for resuming list queries.
//!
//! A cursor names the position just past one record in the order of one
//! particular query. On the wire it is URL-safe base64 over a small JSON
//! object; callers treat it as an opaque string.

use crate::{error::Result, Error, RecordId, Scalar, SortDirection, SortOrder};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position in the result order of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Sort order the position was taken under
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    /// Sort value of the record the cursor follows
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    /// Identifier of the record the cursor follows
    #[serde(rename = "i")]
    pub id: RecordId,
}

impl Cursor {
    /// The position just past record `id`.
    pub fn after(sort: Option<SortOrder>, value: Option<Scalar>, id: impl Into<RecordId>) -> Self {
        Self {
            sort,
            value,
            id: id.into(),
        }
    }

    /// Encode as an opaque token.
    pub fn encode(&self) -> String {
        // Serializing plain strings and scalars cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decode a token produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::InvalidCursor);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| Error::InvalidCursor)?;
        serde_json::from_slice(&bytes).map_err(|_| Error::InvalidCursor)
    }

    /// Whether this cursor was taken under `sort`.
    ///
    /// A cursor from a differently sorted query is stale.
    pub fn applies_to(&self, sort: Option<&SortOrder>) -> bool {
        self.sort.as_ref() == sort && self.value.is_some() == sort.is_some()
    }

    /// Compare the record at (`value`, `id`) with this cursor's position.
    pub fn compare(&self, value: Option<&Scalar>, id: &str) -> Ordering {
        compare_positions(
            self.sort.as_ref().map(|s| s.direction),
            (value, id),
            (self.value.as_ref(), &self.id),
        )
    }
}

/// Order two (sort value, id) positions.
///
/// Sort values order by direction; ties and unsorted queries fall back to
/// ascending id.
pub(crate) fn compare_positions(
    direction: Option<SortDirection>,
    (a_value, a_id): (Option<&Scalar>, &str),
    (b_value, b_id): (Option<&Scalar>, &str),
) -> Ordering {
    let by_value = match (a_value, b_value) {
        (Some(a), Some(b)) => match direction {
            Some(SortDirection::Descending) => b.total_cmp(a),
            _ => a.total_cmp(b),
        },
        _ => Ordering::Equal,
    };
    by_value.then_with(|| a_id.cmp(b_id))
}
