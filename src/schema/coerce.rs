//! String-to-typed conversion for path, query and header values.
//!
//! Values in the URL and headers are always strings on the wire. Before a
//! schema sees them they are converted according to the type the schema
//! declares for each property, so an `integer` path parameter validates.

use serde_json::{Map, Value};
use std::collections::HashMap;

const MAX_REF_DEPTH: usize = 8;

/// Follow local `$ref`s (`#/$defs/..`, `#/definitions/..`, `#/components/schemas/..`)
/// against the root document.
pub(crate) fn resolve<'a>(schema: &'a Value, root: &'a Value) -> &'a Value {
    let mut current = schema;
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return current;
        };
        let target = ["#/$defs/", "#/definitions/", "#/components/schemas/"]
            .iter()
            .find_map(|&prefix| {
                let name = reference.strip_prefix(prefix)?;
                let section = &prefix[2..prefix.len() - 1];
                section
                    .split('/')
                    .try_fold(root, |node, key| node.get(key))
                    .and_then(|defs| defs.get(name))
            });
        match target {
            Some(next) => current = next,
            None => return current,
        }
    }
    current
}

/// Properties and required names of an object-shaped schema.
///
/// Returns `None` when the schema does not describe an object with
/// `properties`.
#[must_use]
pub fn object_properties(schema: &Value) -> Option<(Map<String, Value>, Vec<String>)> {
    let object = resolve(schema, schema);
    let properties = object.get("properties")?.as_object()?.clone();
    let required = object
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Some((properties, required))
}

fn primitive_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    }
}

/// Convert a raw string according to the declared property schema.
///
/// Unparseable input stays a string so the schema reports the mismatch.
#[must_use]
pub fn coerce_value(raw: &str, schema: Option<&Value>) -> Value {
    match schema.and_then(primitive_type) {
        Some("integer") => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("number") => raw
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("boolean") => raw
            .parse::<bool>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("array") => {
            let items = schema.and_then(|s| s.get("items"));
            Value::Array(
                raw.split(',')
                    .filter(|part| !part.is_empty())
                    .map(|part| coerce_value(part, items))
                    .collect(),
            )
        }
        _ => Value::String(raw.to_string()),
    }
}

/// Coerce every string member of `object` using the schema's property types.
///
/// Non-object input and non-string members are returned unchanged.
#[must_use]
pub fn coerce_object(object: &Value, schema: &Value) -> Value {
    let Value::Object(members) = object else {
        return object.clone();
    };
    let root = schema;
    let properties = resolve(schema, root).get("properties");
    let coerced = members
        .iter()
        .map(|(key, value)| {
            let converted = match value {
                Value::String(raw) => {
                    let declared = properties
                        .and_then(|p| p.get(key))
                        .map(|p| resolve(p, root));
                    coerce_value(raw, declared)
                }
                other => other.clone(),
            };
            (key.clone(), converted)
        })
        .collect();
    Value::Object(coerced)
}

/// Build an object from header-like pairs, renaming keys to the spelling the
/// schema declares when they match case-insensitively.
#[must_use]
pub fn align_object_keys(pairs: &HashMap<String, String>, schema: Option<&Value>) -> Value {
    let declared: Vec<String> = schema
        .and_then(object_properties)
        .map(|(props, _)| props.keys().cloned().collect())
        .unwrap_or_default();
    let aligned = pairs
        .iter()
        .map(|(key, value)| {
            let name = declared
                .iter()
                .find(|d| d.eq_ignore_ascii_case(key))
                .cloned()
                .unwrap_or_else(|| key.clone());
            (name, Value::String(value.clone()))
        })
        .collect();
    Value::Object(aligned)
}
