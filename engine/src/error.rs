//! Error types for the SimplyPut engine.

use crate::{Kind, RecordId};
use thiserror::Error;

/// All possible errors from the SimplyPut engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Lookup errors
    #[error("record not found: {kind}/{id}")]
    RecordNotFound { kind: Kind, id: RecordId },

    // Input errors
    #[error("kind must not be empty")]
    EmptyKind,

    #[error("empty list at '{0}' cannot be stored")]
    EmptyList(String),

    #[error("list at '{0}' contains a nested document or list")]
    NestedListElement(String),

    #[error("invalid key '{key}' under '{prefix}'")]
    InvalidKey { prefix: String, key: String },

    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("invalid where: {0}")]
    InvalidFilter(String),

    #[error("invalid sort: {0}")]
    InvalidSort(String),

    #[error("invalid cursor")]
    InvalidCursor,

    // Store errors
    #[error("write attempted in a read-only transaction")]
    ReadOnlyTransaction,

    #[error("store failure: {0}")]
    Store(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Coarse classification of an [`Error`], as surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed record does not exist
    NotFound,
    /// The caller sent something the engine cannot accept
    InvalidInput,
    /// The store or the engine itself failed
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RecordNotFound { .. } => ErrorKind::NotFound,
            Error::EmptyKind
            | Error::EmptyList(_)
            | Error::NestedListElement(_)
            | Error::InvalidKey { .. }
            | Error::InvalidLimit(_)
            | Error::InvalidFilter(_)
            | Error::InvalidSort(_)
            | Error::InvalidCursor => ErrorKind::InvalidInput,
            Error::ReadOnlyTransaction | Error::Store(_) | Error::InvalidSnapshot(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn not_found(kind: &str, id: &str) -> Self {
        Error::RecordNotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
