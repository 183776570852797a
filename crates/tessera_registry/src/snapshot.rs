//! Serializable view of a composition.
//!
//! Snapshots carry fingerprints and summaries instead of raw content so
//! they stay small enough to hand to a model as context.

use crate::registry::PanelRegistry;
use crate::state::{PanelSelection, PanelState};
use serde::{Deserialize, Serialize};
use tessera_core::{CompositionResult, Fingerprint, PanelId, ProtocolVersion};
use tessera_schema::{Layout, Link};

/// Content-free description of one panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSummary {
    /// Panel id
    pub id: PanelId,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// View discriminator
    pub view: String,
    /// Shown
    pub visible: bool,
    /// Collapsed
    pub collapsed: bool,
    /// Loading indicator
    pub loading: bool,
    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Human-readable content summary
    pub summary: String,
    /// Current selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<PanelSelection>,
}

impl From<&PanelState> for PanelSummary {
    fn from(panel: &PanelState) -> Self {
        Self {
            id: panel.id.clone(),
            label: panel.label.clone(),
            view: panel.view_kind().to_string(),
            visible: panel.visible,
            collapsed: panel.collapsed,
            loading: panel.loading,
            error: panel.error.clone(),
            fingerprint: panel.fingerprint.clone(),
            summary: panel.summary.clone(),
            selection: panel.selection.clone(),
        }
    }
}

/// Point-in-time view of the whole registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSnapshot {
    /// Patch protocol version the snapshot corresponds to
    pub version: ProtocolVersion,
    /// Registry revision at capture time
    pub revision: u64,
    /// Layout
    pub layout: Layout,
    /// Panels in placement order
    pub panels: Vec<PanelSummary>,
    /// Links in declaration order
    pub links: Vec<Link>,
}

impl CompositionSnapshot {
    /// Capture the registry
    #[must_use]
    pub fn capture(registry: &PanelRegistry) -> Self {
        Self {
            version: ProtocolVersion::PATCH,
            revision: registry.revision(),
            layout: registry.layout().clone(),
            panels: registry.panels().map(PanelSummary::from).collect(),
            links: registry.links().to_vec(),
        }
    }

    /// Look up a panel summary
    #[must_use]
    pub fn panel(&self, id: &str) -> Option<&PanelSummary> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    ///
    /// Returns `Decode` if serialization fails
    pub fn to_json(&self) -> CompositionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
