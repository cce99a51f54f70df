//! Converts document fields to and from Automerge objects.
//!
//! The store keeps every document as a map object:
//!
//! ```text
//! ROOT
//! └── "recipes/abc/comments"      (map: one entry per collection path)
//!     └── "c1"                    (map: one entry per document)
//!         ├── "text"      -> Str
//!         ├── "timestamp" -> Timestamp (ms)
//!         └── "tags"      -> List
//! ```

use std::borrow::Cow;

use automerge::transaction::Transactable;
use automerge::{AutoCommit, AutomergeError, ObjId, ObjType, ReadDoc, ScalarValue, Value};
use chrono::DateTime;

use super::{FieldValue, Fields};

/// Writes all fields into an existing map object, replacing same-named fields.
pub(crate) fn write_fields(
    doc: &mut AutoCommit,
    obj: &ObjId,
    fields: &Fields,
) -> Result<(), AutomergeError> {
    for (name, value) in fields {
        write_field(doc, obj, name, value)?;
    }
    Ok(())
}

/// Writes one field into a map object.
pub(crate) fn write_field(
    doc: &mut AutoCommit,
    obj: &ObjId,
    name: &str,
    value: &FieldValue,
) -> Result<(), AutomergeError> {
    match value {
        FieldValue::Array(items) => {
            let list = doc.put_object(obj, name, ObjType::List)?;
            for (i, item) in items.iter().enumerate() {
                insert_item(doc, &list, i, item)?;
            }
        }
        scalar => doc.put(obj, name, to_scalar(scalar))?,
    }
    Ok(())
}

/// Inserts a value into a list object at `index`.
pub(crate) fn insert_item(
    doc: &mut AutoCommit,
    list: &ObjId,
    index: usize,
    value: &FieldValue,
) -> Result<(), AutomergeError> {
    match value {
        FieldValue::Array(items) => {
            let nested = doc.insert_object(list, index, ObjType::List)?;
            for (i, item) in items.iter().enumerate() {
                insert_item(doc, &nested, i, item)?;
            }
        }
        scalar => doc.insert(list, index, to_scalar(scalar))?,
    }
    Ok(())
}

fn to_scalar(value: &FieldValue) -> ScalarValue {
    match value {
        FieldValue::Bool(b) => ScalarValue::Boolean(*b),
        FieldValue::Int(i) => ScalarValue::Int(*i),
        FieldValue::Float(f) => ScalarValue::F64(*f),
        FieldValue::String(s) => ScalarValue::Str(s.as_str().into()),
        FieldValue::Timestamp(ts) => ScalarValue::Timestamp(ts.timestamp_millis()),
        // Sentinels are resolved before reaching the codec.
        FieldValue::Null | FieldValue::ServerTimestamp | FieldValue::Array(_) => {
            ScalarValue::Null
        }
    }
}

/// Reads every field of a map object.
pub(crate) fn read_fields(doc: &AutoCommit, obj: &ObjId) -> Result<Fields, AutomergeError> {
    let mut fields = Fields::new();
    for key in doc.keys(obj) {
        if let Some((value, id)) = doc.get(obj, key.as_str())? {
            fields.insert(key, read_value(doc, value, &id)?);
        }
    }
    Ok(fields)
}

/// Reads the list of values held in a list object.
pub(crate) fn read_list(doc: &AutoCommit, list: &ObjId) -> Result<Vec<FieldValue>, AutomergeError> {
    let mut items = Vec::with_capacity(doc.length(list));
    for i in 0..doc.length(list) {
        if let Some((value, id)) = doc.get(list, i)? {
            items.push(read_value(doc, value, &id)?);
        }
    }
    Ok(items)
}

fn read_value(doc: &AutoCommit, value: Value<'_>, id: &ObjId) -> Result<FieldValue, AutomergeError> {
    match value {
        Value::Object(ObjType::List) => Ok(FieldValue::Array(read_list(doc, id)?)),
        Value::Object(_) => Ok(FieldValue::Null),
        Value::Scalar(scalar) => Ok(from_scalar(scalar)),
    }
}

fn from_scalar(scalar: Cow<'_, ScalarValue>) -> FieldValue {
    match &*scalar {
        ScalarValue::Str(s) => FieldValue::String(s.to_string()),
        ScalarValue::Int(i) => FieldValue::Int(*i),
        ScalarValue::Uint(u) => FieldValue::Int(*u as i64),
        ScalarValue::F64(f) => FieldValue::Float(*f),
        ScalarValue::Boolean(b) => FieldValue::Bool(*b),
        ScalarValue::Timestamp(ms) => DateTime::from_timestamp_millis(*ms)
            .map(FieldValue::Timestamp)
            .unwrap_or(FieldValue::Null),
        _ => FieldValue::Null,
    }
}
