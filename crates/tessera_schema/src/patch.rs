//! The `ui_patch` message and its operations.
//!
//! Operations are decoded one at a time so that a malformed or unknown op
//! late in a message does not prevent the ops before it from applying.

use crate::layout::Layout;
use crate::link::Link;
use crate::panel::PanelSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_core::{CompositionError, CompositionResult, PanelId, ProtocolVersion};

/// Expected `type` discriminator
pub const PATCH_TYPE: &str = "ui_patch";

/// How `update-panel` combines data with existing content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
    /// Overwrite content (or one field of it)
    Replace,
    /// Shallow merge
    Merge,
    /// Extend an array field
    Append,
}

/// A structural operation on the composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PatchOp {
    /// Insert a panel, optionally after an anchor
    AddPanel {
        panel: PanelSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<PanelId>,
    },
    /// Delete a panel and every link touching it
    RemovePanel { panel_id: PanelId },
    /// Change a panel's content
    UpdatePanel {
        panel_id: PanelId,
        action: UpdateAction,
        data: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_field: Option<String>,
    },
    /// Set the visible flag
    ShowPanel { panel_id: PanelId, visible: bool },
    /// Set the collapsed flag
    CollapsePanel { panel_id: PanelId, collapsed: bool },
    /// Set the loading flag
    SetLoading { panel_id: PanelId, loading: bool },
    /// Set or clear the error message
    SetError { panel_id: PanelId, error: Option<String> },
    /// Replace the layout wholesale
    UpdateLayout { layout: Layout },
    /// Add a link unless its (source, target, type) already exists
    AddLink { link: Link },
    /// Remove every link between an ordered pair
    RemoveLink { source: PanelId, target: PanelId },
}

impl PatchOp {
    /// Every recognized discriminator
    pub const KNOWN_OPS: [&'static str; 10] = [
        "add-panel",
        "remove-panel",
        "update-panel",
        "show-panel",
        "collapse-panel",
        "set-loading",
        "set-error",
        "update-layout",
        "add-link",
        "remove-link",
    ];

    /// Wire discriminator
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddPanel { .. } => "add-panel",
            Self::RemovePanel { .. } => "remove-panel",
            Self::UpdatePanel { .. } => "update-panel",
            Self::ShowPanel { .. } => "show-panel",
            Self::CollapsePanel { .. } => "collapse-panel",
            Self::SetLoading { .. } => "set-loading",
            Self::SetError { .. } => "set-error",
            Self::UpdateLayout { .. } => "update-layout",
            Self::AddLink { .. } => "add-link",
            Self::RemoveLink { .. } => "remove-link",
        }
    }

    /// Whether applying this op changes the link set
    #[must_use]
    pub const fn touches_links(&self) -> bool {
        matches!(
            self,
            Self::AddLink { .. } | Self::RemoveLink { .. } | Self::RemovePanel { .. }
        )
    }

    /// Whether applying this op can change which links are routable
    ///
    /// Adding a panel can bring a pending link's missing endpoint online.
    #[must_use]
    pub const fn reshapes_routes(&self) -> bool {
        self.touches_links() || matches!(self, Self::AddPanel { .. })
    }

    /// Decode one op, separating unknown discriminators from bad payloads
    ///
    /// # Errors
    ///
    /// `UnknownOp` if the discriminator is not recognized, `Validation` if
    /// the payload does not match the op's shape
    pub fn decode(value: &Value) -> CompositionResult<Self> {
        let op = value
            .get("op")
            .and_then(Value::as_str)
            .ok_or_else(|| CompositionError::validation("op", "missing op discriminator"))?;

        if !Self::KNOWN_OPS.contains(&op) {
            return Err(CompositionError::UnknownOp { op: op.to_string() });
        }

        serde_json::from_value(value.clone())
            .map_err(|e| CompositionError::validation(op, e.to_string()))
    }
}

/// Envelope with ops left undecoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchEnvelope {
    /// Must be `ui_patch`
    #[serde(rename = "type")]
    pub kind: String,
    /// Must be `3.0`
    pub version: ProtocolVersion,
    /// Raw ops in order
    pub ops: Vec<Value>,
}

impl PatchEnvelope {
    /// Decode and check the envelope header
    ///
    /// # Errors
    ///
    /// Returns error if the header is wrong or `ops` is not an array
    pub fn from_value(value: &Value) -> CompositionResult<Self> {
        let envelope: Self = serde_json::from_value(value.clone())
            .map_err(|e| CompositionError::validation("ui_patch", e.to_string()))?;
        if envelope.kind != PATCH_TYPE {
            return Err(CompositionError::validation(
                "type",
                format!("expected \"{}\", got \"{}\"", PATCH_TYPE, envelope.kind),
            ));
        }
        if envelope.version != ProtocolVersion::PATCH {
            return Err(CompositionError::validation(
                "version",
                format!("unsupported patch version {}", envelope.version),
            ));
        }
        Ok(envelope)
    }
}

/// A fully decoded patch message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiPatch {
    /// Must be `ui_patch`
    #[serde(rename = "type")]
    pub kind: String,
    /// Must be `3.0`
    pub version: ProtocolVersion,
    /// Ops in application order
    pub ops: Vec<PatchOp>,
}

impl UiPatch {
    /// Wrap ops in a current-version envelope
    #[must_use]
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self {
            kind: PATCH_TYPE.to_string(),
            version: ProtocolVersion::PATCH,
            ops,
        }
    }
}
