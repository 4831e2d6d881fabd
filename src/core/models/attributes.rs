use serde_json::Value;

/// Ordered mapping of field name to value, as captured for one side
/// (`old` or `attributes`) of a lifecycle event.
///
/// Insertion order is preserved (serde_json `preserve_order`), so labels
/// come out in the order the fields were first seen.
pub type AttributeMap = serde_json::Map<String, Value>;

/// Returns true for values that carry no information in a log entry:
/// `null`, empty strings and empty arrays/objects.
///
/// `false` and `0` are real values and are kept.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
