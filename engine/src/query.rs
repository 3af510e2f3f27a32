//! List queries: request parsing, store query building and paging.

use crate::{
    codec, error::Result, store::Transaction, Cursor, Document, Error, Kind, Property, Scalar,
};
use serde::{Deserialize, Serialize};

/// Page size used when the request does not name one.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest page a single request may ask for.
pub const MAX_LIMIT: usize = 1000;

/// Marker prefix for a descending sort key.
const DESCENDING_MARKER: char = '-';

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// Sort by one property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    #[serde(rename = "f")]
    pub field: String,
    #[serde(rename = "d")]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse `field` or `-field`.
    pub fn parse(expr: &str) -> Result<Self> {
        let (field, direction) = match expr.strip_prefix(DESCENDING_MARKER) {
            Some(field) => (field, SortDirection::Descending),
            None => (expr, SortDirection::Ascending),
        };
        if field.is_empty() {
            return Err(Error::InvalidSort(expr.to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// The value a record sorts by, if it has the property at all.
    ///
    /// Repeated properties sort by their smallest value ascending and their
    /// largest value descending.
    pub fn sort_value(&self, properties: &[Property]) -> Option<Scalar> {
        let values = properties
            .iter()
            .filter(|p| p.name == self.field)
            .map(|p| &p.value);
        let chosen = match self.direction {
            SortDirection::Ascending => values.min_by(|a, b| a.total_cmp(b)),
            SortDirection::Descending => values.max_by(|a, b| a.total_cmp(b)),
        };
        chosen.cloned()
    }
}

/// String equality on one property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parse `field=value`.
    pub fn parse(expr: &str) -> Result<Self> {
        let mut parts = expr.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(value), None) if !field.is_empty() => Ok(Self::new(field, value)),
            _ => Err(Error::InvalidFilter(expr.to_string())),
        }
    }

    /// Whether any property at this path holds the filter's string.
    pub fn matches(&self, properties: &[Property]) -> bool {
        properties
            .iter()
            .any(|p| p.name == self.field && p.value.as_str() == Some(self.value.as_str()))
    }
}

/// A caller's list request, before any store access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Requested page size; 0 means [`DEFAULT_LIMIT`]
    pub limit: usize,
    /// Equality filters, all of which must match
    pub filters: Vec<Filter>,
    /// Optional sort
    pub sort: Option<SortOrder>,
    /// Token to resume after, or empty
    pub start: String,
    /// Token to stop at, or empty
    pub end: String,
}

impl ListRequest {
    /// Build a request from URL query pairs.
    ///
    /// Recognises `limit`, `start`, `end`, `sort` and repeated `where`; other
    /// keys are ignored. For single-valued keys the first occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut limit = None;
        let mut start = None;
        let mut end = None;
        let mut sort = None;
        let mut filters = Vec::new();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "limit" if limit.is_none() => limit = Some(value.to_string()),
                "start" if start.is_none() => start = Some(value.to_string()),
                "end" if end.is_none() => end = Some(value.to_string()),
                "sort" if sort.is_none() => sort = Some(value.to_string()),
                "where" => filters.push(Filter::parse(value)?),
                _ => {}
            }
        }

        let limit = match limit.as_deref() {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| Error::InvalidLimit(raw.to_string()))?,
        };
        let sort = match sort.as_deref() {
            None | Some("") => None,
            Some(expr) => Some(SortOrder::parse(expr)?),
        };

        Ok(Self {
            limit,
            filters,
            sort,
            start: start.unwrap_or_default(),
            end: end.unwrap_or_default(),
        })
    }

    /// The page size actually applied.
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_LIMIT,
            n => n.min(MAX_LIMIT),
        }
    }
}

/// A fully resolved query handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub kind: Kind,
    pub filters: Vec<Filter>,
    pub sort: Option<SortOrder>,
    /// Resume strictly after this position
    pub start: Option<Cursor>,
    /// Stop after this position
    pub end: Option<Cursor>,
    pub limit: usize,
}

impl StoreQuery {
    /// Resolve a request against `kind`.
    ///
    /// Cursors that fail to decode, or that were taken under another sort,
    /// are dropped and leave that side unbounded.
    pub fn new(kind: impl Into<Kind>, request: &ListRequest) -> Self {
        let sort = request.sort.clone();
        let bound = |token: &str| {
            Cursor::decode(token)
                .ok()
                .filter(|cursor| cursor.applies_to(sort.as_ref()))
        };
        Self {
            kind: kind.into(),
            filters: request.filters.clone(),
            start: bound(&request.start),
            end: bound(&request.end),
            sort,
            limit: request.effective_limit(),
        }
    }

    /// Whether a record's properties pass every filter.
    pub fn matches(&self, properties: &[Property]) -> bool {
        self.filters.iter().all(|f| f.matches(properties))
    }
}

/// One page of decoded documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Document>,
    /// Token resuming after the last item
    pub next_start_token: String,
}

/// Run a list query inside `txn`.
///
/// Any store error aborts the whole page.
pub fn run_query(txn: &dyn Transaction, kind: &str, request: &ListRequest) -> Result<Page> {
    let query = StoreQuery::new(kind, request);
    let mut stream = txn.iterate(&query)?;

    let mut items = Vec::new();
    let mut next = None;
    while items.len() < query.limit {
        let Some(entry) = stream.next() else {
            break;
        };
        let (id, properties) = entry?;
        items.push(codec::unflatten(&properties, &id));
        next = stream.cursor();
    }

    let next_start_token = next
        .or(query.start)
        .map(|cursor| cursor.encode())
        .unwrap_or_default();

    Ok(Page {
        items,
        next_start_token,
    })
}
