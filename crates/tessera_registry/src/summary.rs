//! Compact, human-readable summaries of panel content.

use serde_json::Value;

/// Summarize common content shapes; empty when nothing is recognized.
#[must_use]
pub fn summarize(content: &Value) -> String {
    let Some(obj) = content.as_object() else {
        return String::new();
    };

    if let Some(features) = obj.get("features").and_then(Value::as_array) {
        return format!("{} features", features.len());
    }

    if let Some(layers) = obj.get("layers").and_then(Value::as_array) {
        let total: usize = layers
            .iter()
            .filter_map(|layer| layer.get("features").and_then(Value::as_array))
            .map(Vec::len)
            .sum();
        return format!("{} layers, {} features", layers.len(), total);
    }

    if let Some(rows) = obj.get("rows").and_then(Value::as_array) {
        let cols = obj
            .get("columns")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        return format!("{} rows, {} columns", rows.len(), cols);
    }

    if let Some(value) = obj.get("value") {
        return match value {
            Value::String(s) => format!("value: {}", s),
            other => format!("value: {}", other),
        };
    }

    if let Some(series) = obj.get("series").and_then(Value::as_array) {
        return format!("{} series", series.len());
    }

    if let Some(items) = obj.get("items").and_then(Value::as_array) {
        return format!("{} items", items.len());
    }

    String::new()
}
