//! # Response Schema, Path Resolution & Field Coercion
//!
//! Pure utilities the controller uses to shape a raw response body into the
//! value a consumer wants: resolve a dotted path inside nested JSON, extract
//! an optional total, and normalize declared date fields to epoch
//! milliseconds.
//!
//! Everything in this module is synchronous and never panics on missing
//! structure; absence always degrades to a fallback.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Type tag for a field that should be coerced to a normalized timestamp.
///
/// - `Date`: a textual date (`2020-01-01`, `2020-01-01 08:30:00`, or RFC 3339)
///   read as UTC.
/// - `Unix`: a unix timestamp in seconds, numeric or numeric string.
///
/// Both normalize to epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Date,
    Unix,
}

/// Describes how to extract and coerce a response body.
///
/// `data_path` defaults to the entire body, `total_path` to no total at all.
/// `field_types` maps field names of the extracted record (or of every record
/// in an extracted sequence) to a [`FieldType`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSchema {
    pub data_path: Option<String>,
    pub total_path: Option<String>,
    pub field_types: HashMap<String, FieldType>,
}

impl ResponseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn total(mut self, path: impl Into<String>) -> Self {
        self.total_path = Some(path.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldType) -> Self {
        self.field_types.insert(name.into(), kind);
        self
    }
}

/// Resolves a dotted path inside a nested value.
///
/// Objects are walked by key, arrays by numeric segment. If any intermediate
/// segment is missing, or the root is not a container, the `fallback` is
/// returned instead of an error.
///
/// ```
/// use serde_json::json;
/// use sync_framework::resolve_path;
///
/// let root = json!({ "a": { "b": 5 } });
/// assert_eq!(resolve_path(&root, "a.b", json!(-1)), json!(5));
/// assert_eq!(resolve_path(&json!({ "a": {} }), "a.b.c", json!(-1)), json!(-1));
/// ```
pub fn resolve_path(root: &Value, path: &str, fallback: Value) -> Value {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(next) => next,
                None => return fallback,
            },
            Value::Array(items) => {
                match segment.parse::<usize>().ok().and_then(|index| items.get(index)) {
                    Some(next) => next,
                    None => return fallback,
                }
            }
            _ => return fallback,
        };
    }
    current.clone()
}

/// Coerces the declared fields of a record, or of every record in a
/// sequence of records, to epoch milliseconds in place.
///
/// Unknown or absent fields are left untouched, as are fields whose value
/// does not parse under the declared type.
pub fn coerce_fields(value: &mut Value, field_types: &HashMap<String, FieldType>) {
    if field_types.is_empty() {
        return;
    }
    match value {
        Value::Array(records) => {
            for record in records {
                coerce_record(record, field_types);
            }
        }
        Value::Object(_) => coerce_record(value, field_types),
        _ => {}
    }
}

fn coerce_record(record: &mut Value, field_types: &HashMap<String, FieldType>) {
    let Value::Object(map) = record else { return };
    for (field, kind) in field_types {
        if let Some(slot) = map.get_mut(field) {
            let millis = match kind {
                FieldType::Date => parse_date_millis(slot),
                FieldType::Unix => parse_unix_millis(slot),
            };
            if let Some(millis) = millis {
                *slot = Value::from(millis);
            }
        }
    }
}

fn parse_date_millis(value: &Value) -> Option<i64> {
    let text = value.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc).timestamp_millis());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc().timestamp_millis());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}

fn parse_unix_millis(value: &Value) -> Option<i64> {
    let seconds = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.parse::<f64>().ok()?,
        _ => return None,
    };
    Some((seconds * 1000.0) as i64)
}
