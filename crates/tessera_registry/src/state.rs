//! Runtime state of a single panel.

use crate::summary::summarize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_core::{Fingerprint, PanelId};
use tessera_schema::{PanelSpec, ShowCondition, UpdateAction};

/// The record a panel currently has selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSelection {
    /// Field the selection was made on
    pub field: Option<String>,
    /// Selected value
    pub value: Value,
}

impl PanelSelection {
    /// A null value or an empty array means "nothing selected"
    #[must_use]
    pub fn is_empty_value(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Panel state held by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    /// Stable id
    pub id: PanelId,
    /// Display label
    pub label: Option<String>,
    /// Renderer discriminator
    pub view_type: Option<String>,
    /// Explicit renderer location
    pub view_url: Option<String>,
    /// Opaque content
    pub content: Value,
    /// Shown
    pub visible: bool,
    /// Collapsed
    pub collapsed: bool,
    /// Loading indicator
    pub loading: bool,
    /// Error message
    pub error: Option<String>,
    /// Ordering hint
    pub priority: Option<i64>,
    /// Field naming the selected record
    pub selection_field: Option<String>,
    /// Visibility gate
    pub show_when: Option<ShowCondition>,
    /// Current selection
    pub selection: Option<PanelSelection>,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Content summary
    pub summary: String,
}

impl PanelState {
    /// Build state with default flags (visible, not loading, no error)
    #[must_use]
    pub fn from_spec(spec: PanelSpec) -> Self {
        let fingerprint = Fingerprint::of(&spec.structured_content);
        let summary = summarize(&spec.structured_content);
        Self {
            id: spec.id,
            label: spec.label,
            view_type: spec.view_type,
            view_url: spec.view_url,
            content: spec.structured_content,
            visible: true,
            collapsed: spec.collapsed.unwrap_or(false),
            loading: false,
            error: None,
            priority: spec.priority,
            selection_field: spec.selection_field,
            show_when: spec.show_when,
            selection: None,
            fingerprint,
            summary,
        }
    }

    /// Build state for initial seeding: hidden when collapsed or gated
    #[must_use]
    pub fn seeded(spec: PanelSpec) -> Self {
        let mut state = Self::from_spec(spec);
        state.visible = !state.collapsed && state.show_when.is_none();
        state
    }

    /// The view discriminator, falling back to the URL
    #[must_use]
    pub fn view_kind(&self) -> &str {
        self.view_type
            .as_deref()
            .or(self.view_url.as_deref())
            .unwrap_or_default()
    }

    /// Whether the panel has a selection
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Replace content and refresh derived fields
    pub fn set_content(&mut self, content: Value) {
        self.fingerprint = Fingerprint::of(&content);
        self.summary = summarize(&content);
        self.content = content;
    }

    /// Combine `data` with the current content
    pub fn update_content(&mut self, data: Value, action: UpdateAction, target_field: Option<&str>) {
        let next = match (action, target_field) {
            (UpdateAction::Replace, None) => data,
            (UpdateAction::Replace, Some(field)) => {
                let mut obj = self.content_object();
                let value = pick(&data, field);
                obj.insert(field.to_string(), value);
                Value::Object(obj)
            }
            (UpdateAction::Merge, _) | (UpdateAction::Append, None) => merge(&self.content, data),
            (UpdateAction::Append, Some(field)) => {
                let mut obj = self.content_object();
                let mut items = match obj.remove(field) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                match pick(&data, field) {
                    Value::Array(more) => items.extend(more),
                    single => items.push(single),
                }
                obj.insert(field.to_string(), Value::Array(items));
                Value::Object(obj)
            }
        };
        self.set_content(next);
    }

    fn content_object(&self) -> Map<String, Value> {
        self.content.as_object().cloned().unwrap_or_default()
    }
}

/// `data[field]` when `data` is an object carrying it, else all of `data`
fn pick(data: &Value, field: &str) -> Value {
    data.get(field).cloned().unwrap_or_else(|| data.clone())
}

/// Shallow merge; a non-object on either side means the fragment wins
fn merge(current: &Value, fragment: Value) -> Value {
    match (current, fragment) {
        (Value::Object(existing), Value::Object(incoming)) => {
            let mut merged = existing.clone();
            merged.extend(incoming);
            Value::Object(merged)
        }
        (_, fragment) => fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn panel(content: Value) -> PanelState {
        PanelState::from_spec(PanelSpec::new("p", "chart").with_content(content))
    }

    #[test]
    fn test_from_spec_defaults() {
        let state = panel(json!({"rows": [], "columns": []}));
        assert!(state.visible);
        assert!(!state.collapsed);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.summary, "0 rows, 0 columns");
        assert_eq!(state.view_kind(), "chart");
    }

    #[test]
    fn test_seeded_visibility() {
        let gated = PanelState::seeded(PanelSpec::new("d", "detail").shown_when_selected("t"));
        assert!(!gated.visible);

        let collapsed = PanelState::seeded(PanelSpec::new("c", "chart").collapsed());
        assert!(!collapsed.visible);
        assert!(collapsed.collapsed);

        let plain = PanelState::seeded(PanelSpec::new("m", "map"));
        assert!(plain.visible);
    }

    #[test]
    fn test_update_replace() {
        let mut state = panel(json!({"a": 1, "b": 2}));
        let before = state.fingerprint.clone();
        state.update_content(json!({"c": 3}), UpdateAction::Replace, None);
        assert_eq!(state.content, json!({"c": 3}));
        assert_ne!(state.fingerprint, before);
    }

    #[test]
    fn test_update_replace_target_field() {
        let mut state = panel(json!({"a": 1, "b": 2}));
        state.update_content(json!({"b": 5, "z": 0}), UpdateAction::Replace, Some("b"));
        assert_eq!(state.content, json!({"a": 1, "b": 5}));
    }

    #[test]
    fn test_update_merge_is_shallow() {
        let mut state = panel(json!({"a": {"x": 1}, "b": 2}));
        state.update_content(json!({"a": {"y": 2}}), UpdateAction::Merge, None);
        assert_eq!(state.content, json!({"a": {"y": 2}, "b": 2}));
    }

    #[test]
    fn test_update_append_target_field() {
        let mut state = panel(json!({"series": [1, 2], "title": "t"}));
        state.update_content(json!({"series": [3, 4]}), UpdateAction::Append, Some("series"));
        assert_eq!(state.content, json!({"series": [1, 2, 3, 4], "title": "t"}));

        state.update_content(json!({"series": 5}), UpdateAction::Append, Some("series"));
        assert_eq!(state.content["series"], json!([1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_update_append_into_missing_field() {
        let mut state = panel(Value::Null);
        state.update_content(json!({"items": ["a"]}), UpdateAction::Append, Some("items"));
        assert_eq!(state.content, json!({"items": ["a"]}));
    }

    #[test]
    fn test_update_append_without_field_merges() {
        let mut state = panel(json!({"a": 1}));
        state.update_content(json!({"b": 2}), UpdateAction::Append, None);
        assert_eq!(state.content, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_selection_empty_values() {
        assert!(PanelSelection::is_empty_value(&Value::Null));
        assert!(PanelSelection::is_empty_value(&json!([])));
        assert!(!PanelSelection::is_empty_value(&json!(["F1"])));
        assert!(!PanelSelection::is_empty_value(&json!(0)));
    }
}
