use serde_json::Value;
use stateboard_types::InstanceObject;

use crate::{Result, records::AttributeValue};

/// Flatten the attributes of one instance object into key/value pairs.
///
/// - `None` yields nothing.
/// - A non-empty legacy flat map is returned verbatim; `attrs_json` is ignored.
/// - Otherwise each top-level field of `attrs_json` becomes one pair whose value
///   is the field re-encoded as compact JSON.
/// - A JSON document that is not an object (bare string, array, ...) yields
///   nothing. Only syntactically invalid JSON is an error.
pub fn flatten_attributes(object: Option<&InstanceObject>) -> Result<Vec<AttributeValue>> {
    let Some(object) = object else {
        return Ok(Vec::new());
    };

    if let Some(flat) = object.attrs_flat.as_ref().filter(|m| !m.is_empty()) {
        return Ok(flat
            .iter()
            .map(|(key, value)| AttributeValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect());
    }

    let Some(raw) = object.attrs_json.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let Value::Object(fields) = serde_json::from_str::<Value>(raw)? else {
        return Ok(Vec::new());
    };

    fields
        .into_iter()
        .map(|(key, value)| -> Result<AttributeValue> {
            Ok(AttributeValue {
                key,
                value: serde_json::to_string(&value)?,
            })
        })
        .collect()
}
