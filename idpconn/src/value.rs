//! Connection records and the two ways their values are turned into text:
//! one for display/export, one for filter matching.

use serde_json::{Map, Value as JsonValue};

/// A single connection entry as returned by the data source.
///
/// Keys keep the order in which the source sent them, which is what the
/// default column order is derived from.
pub type Record = Map<String, JsonValue>;

/// Render a value as the text shown in a table cell or written to an export.
///
/// Arrays are rendered element-wise and joined with `", "`, objects as their
/// compact JSON text and `null` as an empty string.
pub fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(arr) => arr.iter().map(cell_text).collect::<Vec<String>>().join(", "),
        JsonValue::Object(_) => value.to_string(),
    }
}

/// Coerce a value into the text that column filters are matched against.
///
/// Differs from [`cell_text`] only for arrays, whose elements are joined with
/// a bare `","`. Only `null` becomes empty: `false` and `0` keep their
/// natural form, so a filter for "false" matches them.
pub fn match_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Array(arr) => arr.iter().map(match_text).collect::<Vec<String>>().join(","),
        _ => cell_text(value),
    }
}

/// Short human-readable description of a value's shape, for diagnostics.
pub(crate) fn describe(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
