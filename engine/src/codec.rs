//! Codec between nested documents and flat property bags.
//!
//! Encoding rules:
//! - a nested document contributes its keys under `prefix + key + "."`
//! - every list element becomes its own property at the list's path, with
//!   `multiple` set
//! - every other value becomes one property at `prefix + key`
//!
//! Decoding runs over the properties in order. A path seen for the second
//! time turns its value into a list; the `multiple` flag is ignored. A
//! one-element list therefore decodes to its bare element.

use crate::{
    error::Result, property::PATH_SEPARATOR, record::ID_KEY, Document, Error, Property,
    PropertyList, Value,
};

/// Encode a document as a property list.
///
/// Fails on an empty list, on a list holding a document or list, and on a
/// key that is empty or contains the path separator.
pub fn flatten(document: &Document) -> Result<PropertyList> {
    let mut properties = PropertyList::new();
    flatten_into(document, "", &mut properties)?;
    Ok(properties)
}

fn flatten_into(document: &Document, prefix: &str, out: &mut PropertyList) -> Result<()> {
    for (key, value) in document {
        if key.is_empty() || key.contains(PATH_SEPARATOR) {
            return Err(Error::InvalidKey {
                prefix: prefix.to_string(),
                key: key.clone(),
            });
        }
        let path = format!("{prefix}{key}");

        match value {
            Value::Document(nested) => {
                flatten_into(nested, &format!("{path}{PATH_SEPARATOR}"), out)?;
            }
            Value::List(items) => {
                if items.is_empty() {
                    return Err(Error::EmptyList(path));
                }
                for item in items {
                    let scalar = item
                        .as_scalar()
                        .ok_or_else(|| Error::NestedListElement(path.clone()))?;
                    out.push(Property::multiple(path.clone(), scalar));
                }
            }
            scalar => {
                if let Some(scalar) = scalar.as_scalar() {
                    out.push(Property::single(path, scalar));
                }
            }
        }
    }
    Ok(())
}

/// Decode a property list into a document and inject `id` under `_id`.
///
/// Properties that collide with an existing value of a different shape are
/// dropped; the earlier value wins.
pub fn unflatten(properties: &[Property], id: &str) -> Document {
    let mut root = Document::new();
    for property in properties {
        insert_property(&mut root, property);
    }
    root.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    root
}

fn insert_property(root: &mut Document, property: &Property) {
    let mut segments = property.segments();
    let Some(leaf) = segments.next_back() else {
        return;
    };

    let mut container = root;
    for segment in segments {
        let slot = container
            .entry(segment.to_string())
            .or_insert_with(|| Value::Document(Document::new()));
        container = match slot {
            Value::Document(nested) => nested,
            _ => return,
        };
    }

    let value = Value::from(property.value.clone());
    match container.get_mut(leaf) {
        None => {
            container.insert(leaf.to_string(), value);
        }
        Some(Value::List(items)) => items.push(value),
        Some(Value::Document(_)) => {}
        Some(existing) => {
            let first = std::mem::replace(existing, Value::Null);
            *existing = Value::List(vec![first, value]);
        }
    }
}
