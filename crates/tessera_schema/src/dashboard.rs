//! Initial composition payloads.
//!
//! A dashboard payload is consumed once at startup. Version `1.0` payloads
//! (no links, URL-only panels) are upgraded to the `2.0` model.

use crate::layout::{Layout, LayoutPreset};
use crate::link::Link;
use crate::panel::PanelSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::{CompositionError, CompositionResult, PanelId, ProtocolVersion};

/// Expected `type` discriminator
pub const DASHBOARD_TYPE: &str = "dashboard";

/// A dashboard payload of either supported version
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    /// Legacy payload
    V1(DashboardV1),
    /// Linked payload
    V2(DashboardV2),
}

/// Version 1.0 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub layout: LayoutV1,
    pub panels: Vec<PanelV1>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
}

/// Version 1.0 layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutV1 {
    /// Side by side
    SplitHorizontal,
    /// Stacked
    SplitVertical,
    /// Auto grid
    Grid,
}

/// Version 1.0 panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelV1 {
    /// Panel id
    pub id: PanelId,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Renderer location
    pub view_url: String,
    /// Initial content
    #[serde(default)]
    pub structured_content: Value,
}

/// Version 2.0 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardV2 {
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Layout descriptor
    pub layout: Layout,
    /// Panels in default placement order
    pub panels: Vec<PanelSpec>,
    /// Cross-view links in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// CSS gap, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    /// Custom viewType -> URL overrides
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub view_registry: IndexMap<String, String>,
}

impl Dashboard {
    /// Decode a payload, dispatching on its `version`
    ///
    /// # Errors
    ///
    /// Returns error if the envelope is not a dashboard or the body is malformed
    pub fn from_value(value: &Value) -> CompositionResult<Self> {
        let kind = value.get("type").and_then(Value::as_str);
        if kind != Some(DASHBOARD_TYPE) {
            return Err(CompositionError::validation(
                "type",
                format!("expected \"{}\", got {:?}", DASHBOARD_TYPE, kind),
            ));
        }

        let version = value
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| CompositionError::validation("version", "missing version string"))?;
        let version = ProtocolVersion::parse(version)
            .map_err(|e| CompositionError::validation("version", e.to_string()))?;

        match version {
            ProtocolVersion::DASHBOARD_V1 => serde_json::from_value(value.clone())
                .map(Self::V1)
                .map_err(|e| CompositionError::validation("dashboard", e.to_string())),
            ProtocolVersion::DASHBOARD_V2 => serde_json::from_value(value.clone())
                .map(Self::V2)
                .map_err(|e| CompositionError::validation("dashboard", e.to_string())),
            other => Err(CompositionError::validation(
                "version",
                format!("unsupported dashboard version {}", other),
            )),
        }
    }

    /// Decode from JSON text
    ///
    /// # Errors
    ///
    /// Returns error if the text is not JSON or not a dashboard
    pub fn from_json(text: &str) -> CompositionResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Payload version
    #[must_use]
    pub fn version(&self) -> ProtocolVersion {
        match self {
            Self::V1(_) => ProtocolVersion::DASHBOARD_V1,
            Self::V2(_) => ProtocolVersion::DASHBOARD_V2,
        }
    }

    /// Upgrade to the linked model
    #[must_use]
    pub fn into_v2(self) -> DashboardV2 {
        match self {
            Self::V2(v2) => v2,
            Self::V1(v1) => {
                let layout = match v1.layout {
                    LayoutV1::SplitHorizontal => LayoutPreset::SplitHorizontal,
                    LayoutV1::SplitVertical => LayoutPreset::SplitVertical,
                    LayoutV1::Grid => LayoutPreset::Grid,
                };
                let panels = v1
                    .panels
                    .into_iter()
                    .map(|p| PanelSpec {
                        id: p.id,
                        label: p.label,
                        view_type: None,
                        view_url: Some(p.view_url),
                        structured_content: p.structured_content,
                        selection_field: None,
                        priority: None,
                        show_when: None,
                        collapsed: None,
                    })
                    .collect();
                DashboardV2 {
                    title: v1.title,
                    layout: Layout::Preset(layout),
                    panels,
                    links: Vec::new(),
                    gap: v1.gap,
                    view_registry: IndexMap::new(),
                }
            }
        }
    }
}

impl DashboardV2 {
    /// Empty dashboard with the given layout
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            title: None,
            layout,
            panels: Vec::new(),
            links: Vec::new(),
            gap: None,
            view_registry: IndexMap::new(),
        }
    }

    /// Add a panel
    #[must_use]
    pub fn with_panel(mut self, panel: PanelSpec) -> Self {
        self.panels.push(panel);
        self
    }

    /// Add a link
    #[must_use]
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }
}
