//! Field projection across a link.
//!
//! Projection only ever narrows an object value by one key. Anything else
//! crosses the link whole.

use serde_json::Value;

/// Value delivered to the target.
///
/// - no `source_field`: the whole value
/// - the event already names `source_field`: the whole value, since it is
///   that field's value
/// - an object value: `value[source_field]`, or `null` when the key is absent
/// - any other value: the whole value
#[must_use]
pub fn project_field(value: &Value, event_field: Option<&str>, source_field: Option<&str>) -> Value {
    let Some(source_field) = source_field else {
        return value.clone();
    };
    if event_field == Some(source_field) {
        return value.clone();
    }
    match value {
        Value::Object(map) => map.get(source_field).cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}

/// Field name the derived event carries: the link's `target_field`, or the
/// outbound event's own field when the link renames nothing
#[must_use]
pub fn derive_field(event_field: Option<&str>, target_field: Option<&str>) -> Option<String> {
    target_field.or(event_field).map(str::to_string)
}
