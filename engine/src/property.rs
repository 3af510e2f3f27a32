//! Flat properties, the store's native record format.

use crate::Scalar;
use serde::{Deserialize, Serialize};

/// Separator between the segments of a property path.
pub const PATH_SEPARATOR: char = '.';

/// A single named scalar in a property bag.
///
/// `name` is the dotted path of the value in the source document. A name may
/// occur more than once in a list; `multiple` records that the value came
/// from a list, but decoding does not rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Dotted path, e.g. `a.b.c`
    pub name: String,
    /// The stored value
    pub value: Scalar,
    /// Whether the value came from a list
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
}

/// An ordered property bag.
pub type PropertyList = Vec<Property>;

impl Property {
    /// A property holding a plain value.
    pub fn single(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            multiple: false,
        }
    }

    /// A property holding one element of a list.
    pub fn multiple(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            multiple: true,
        }
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.name.split(PATH_SEPARATOR)
    }
}
