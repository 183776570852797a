//! Panel declarations as they arrive on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::PanelId;

/// Reveal a panel only once another panel has a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowCondition {
    /// Panel whose selection gates visibility
    pub linked_panel_has_selection: PanelId,
}

/// A panel definition (dashboard v2.0 and `add-panel`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSpec {
    /// Stable panel id
    pub id: PanelId,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Renderer discriminator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_type: Option<String>,
    /// Explicit renderer location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
    /// Opaque content owned by the view
    #[serde(default)]
    pub structured_content: Value,
    /// Field naming the selected record in this panel's selection events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_field: Option<String>,
    /// Ordering hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Visibility gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowCondition>,
    /// Start collapsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl PanelSpec {
    /// Create a spec bound to a view type with null content
    #[must_use]
    pub fn new(id: impl Into<PanelId>, view_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            view_type: Some(view_type.into()),
            view_url: None,
            structured_content: Value::Null,
            selection_field: None,
            priority: None,
            show_when: None,
            collapsed: None,
        }
    }

    /// Set content
    #[must_use]
    pub fn with_content(mut self, content: Value) -> Self {
        self.structured_content = content;
        self
    }

    /// Set label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set selection field
    #[must_use]
    pub fn with_selection_field(mut self, field: impl Into<String>) -> Self {
        self.selection_field = Some(field.into());
        self
    }

    /// Gate visibility on another panel's selection
    #[must_use]
    pub fn shown_when_selected(mut self, panel: impl Into<PanelId>) -> Self {
        self.show_when = Some(ShowCondition {
            linked_panel_has_selection: panel.into(),
        });
        self
    }

    /// Start collapsed
    #[must_use]
    pub fn collapsed(mut self) -> Self {
        self.collapsed = Some(true);
        self
    }

    /// The view discriminator the core reports, falling back to the URL
    #[must_use]
    pub fn view_kind(&self) -> &str {
        self.view_type
            .as_deref()
            .or(self.view_url.as_deref())
            .unwrap_or_default()
    }
}
